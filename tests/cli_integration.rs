//! CLI integration tests using assert_cmd to exercise the actual binaries.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use interactive_feedback::prompt::EXIT_NO_TERMINAL;

fn feedback_mcp() -> Command {
    Command::cargo_bin("interactive-feedback-mcp").unwrap()
}

/// Point the CLI at an inline `sh -c` stub and an empty config.
fn with_stub(cmd: &mut Command, tmp: &TempDir, script: &str) {
    cmd.arg("--config")
        .arg(tmp.path().join("config.yml"))
        .arg("--handoff-dir")
        .arg(tmp.path().join("handoff"))
        .args(["--prompt-command", "sh"])
        .arg("--prompt-arg=-c")
        .arg(format!("--prompt-arg={script}"))
        .arg("--prompt-arg=stub");
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

#[test]
fn cli_ask_prints_answer() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = feedback_mcp();
    with_stub(&mut cmd, &tmp, r#"printf '{"choice":"%s"}' "$6" > "$4""#);

    cmd.args(["ask", "Pick a color", "--option", "red", "--option", "blue"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""choice": "red|||blue""#));

    assert_eq!(
        std::fs::read_dir(tmp.path().join("handoff")).unwrap().count(),
        0
    );
}

#[test]
fn cli_ask_reports_launch_failure() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = feedback_mcp();
    with_stub(&mut cmd, &tmp, "exit 2");

    cmd.args(["ask", "Confirm?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt exited with status 2"));
}

#[test]
fn cli_ask_reports_missing_prompt_program() {
    let tmp = TempDir::new().unwrap();

    feedback_mcp()
        .arg("--config")
        .arg(tmp.path().join("config.yml"))
        .arg("--prompt-command")
        .arg(tmp.path().join("does-not-exist"))
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to launch feedback prompt"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn cli_config_merges_file_and_flags() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.yml");
    std::fs::write(
        &config,
        "prompt:\n  command: /usr/bin/python3\n  args: [\"-u\", \"feedback_ui.py\"]\nlog_level: warn\n",
    )
    .unwrap();

    feedback_mcp()
        .arg("--config")
        .arg(&config)
        .args(["--log-level", "debug", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/usr/bin/python3"))
        .stdout(predicate::str::contains("feedback_ui.py"))
        .stdout(predicate::str::contains("log_level: debug"));
}

#[test]
fn cli_config_rejects_bad_yaml() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.yml");
    std::fs::write(&config, "prompt: [oops").unwrap();

    feedback_mcp()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

// ---------------------------------------------------------------------------
// feedback-prompt
// ---------------------------------------------------------------------------

#[test]
fn prompt_help_lists_contract_flags() {
    Command::cargo_bin("feedback-prompt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--prompt"))
        .stdout(predicate::str::contains("--output-file"))
        .stdout(predicate::str::contains("--predefined-options"));
}

#[test]
fn prompt_without_terminal_exits_with_no_terminal_status() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.json");

    Command::cargo_bin("feedback-prompt")
        .unwrap()
        .arg("--tty")
        .arg(tmp.path().join("no-tty"))
        .args(["--terminal", "none", "--prompt", "Pick a color"])
        .args(["--predefined-options", "red|||blue", "--output-file"])
        .arg(&output)
        .assert()
        .code(EXIT_NO_TERMINAL)
        .stderr(predicate::str::contains("no terminal available"));

    assert!(!output.exists());
}

#[test]
fn cli_ask_with_bundled_prompt_and_no_terminal_fails_with_reason() {
    let tmp = TempDir::new().unwrap();

    feedback_mcp()
        .arg("--config")
        .arg(tmp.path().join("config.yml"))
        .arg("--handoff-dir")
        .arg(tmp.path().join("handoff"))
        .arg("--prompt-command")
        .arg(env!("CARGO_BIN_EXE_feedback-prompt"))
        .arg(format!(
            "--prompt-arg=--tty={}",
            tmp.path().join("no-tty").display()
        ))
        .arg("--prompt-arg=--terminal=none")
        .args(["ask", "Pick a color", "--option", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no terminal available to ask the user"));
}
