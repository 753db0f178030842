//! Terminal prompt launched by the feedback broker.
//!
//! The broker discards this process's stdio, so the question is asked on the
//! controlling terminal instead. Hosts that start the server without one
//! (IDEs, desktop MCP clients) get a terminal emulator window; if none can be
//! started the prompt exits with `EXIT_NO_TERMINAL`.

use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use clap::Parser;

use interactive_feedback::prompt::{
    self, terminal_candidates, TerminalPrompt, EXIT_NO_TERMINAL, TERMINAL_NONE,
};
use interactive_feedback::PredefinedOptions;

#[derive(Parser)]
#[command(name = "feedback-prompt", version, about = "Run the feedback prompt")]
struct Args {
    /// The prompt to show to the user.
    #[arg(
        long,
        default_value = "I implemented the changes you requested.",
        allow_hyphen_values = true
    )]
    prompt: String,

    /// Options separated by |||.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    predefined_options: String,

    /// Path to save the feedback result as JSON.
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Terminal device to ask on. Default: the controlling terminal.
    #[arg(long)]
    tty: Option<PathBuf>,

    /// Emulator to open when there is no terminal ("none" to disable).
    /// Default: $TERMINAL, then common emulators, when a display is available.
    #[arg(long)]
    terminal: Option<String>,
}

#[cfg(unix)]
const DEFAULT_TTY: (&str, &str) = ("/dev/tty", "/dev/tty");
#[cfg(windows)]
const DEFAULT_TTY: (&str, &str) = ("CONIN$", "CONOUT$");

fn open_terminal(tty: Option<&Path>) -> anyhow::Result<(BufReader<File>, File)> {
    let (input_path, output_path) = match tty {
        Some(path) => (path, path),
        None => (Path::new(DEFAULT_TTY.0), Path::new(DEFAULT_TTY.1)),
    };
    let input = File::open(input_path)
        .with_context(|| format!("cannot open {}", input_path.display()))?;
    let output = OpenOptions::new()
        .write(true)
        .open(output_path)
        .with_context(|| format!("cannot open {}", output_path.display()))?;
    Ok((BufReader::new(input), output))
}

fn has_display() -> bool {
    cfg!(target_os = "macos")
        || ["DISPLAY", "WAYLAND_DISPLAY"]
            .iter()
            .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

/// Re-run this prompt inside a terminal emulator. Returns whether an answer
/// was written to `output_file`.
fn ask_in_emulator(args: &Args, output_file: &Path) -> anyhow::Result<bool> {
    let exe = std::env::current_exe().context("cannot locate feedback-prompt")?;
    let env_terminal = std::env::var("TERMINAL").ok();
    let candidates =
        terminal_candidates(args.terminal.as_deref(), env_terminal.as_deref(), has_display());

    for launcher in candidates {
        let status = Command::new(&launcher.program)
            .args(&launcher.args)
            .arg(&exe)
            .args(["--terminal", TERMINAL_NONE])
            .arg("--prompt")
            .arg(&args.prompt)
            .arg("--output-file")
            .arg(output_file)
            .arg("--predefined-options")
            .arg(&args.predefined_options)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(_) => {
                // Emulators rarely forward the inner exit status; the file is the answer.
                let written = std::fs::metadata(output_file).is_ok_and(|m| m.len() > 0);
                return Ok(written);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                eprintln!("feedback-prompt: cannot start {}: {}", launcher.program, e);
            }
        }
    }
    Ok(false)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let options = PredefinedOptions::decode(&args.predefined_options);

    let (input, output) = match open_terminal(args.tty.as_deref()) {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("feedback-prompt: {e:#}");
            if let Some(path) = &args.output_file {
                if ask_in_emulator(&args, path)? {
                    return Ok(());
                }
            }
            eprintln!("feedback-prompt: no terminal available to ask the user");
            std::process::exit(EXIT_NO_TERMINAL);
        }
    };
    let text = TerminalPrompt::new(input, output).ask(&args.prompt, options.as_slice())?;

    match &args.output_file {
        Some(path) => prompt::write_result(path, &text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("\nFeedback received:\n{text}"),
    }
    Ok(())
}
