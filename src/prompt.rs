//! Terminal implementation of the interactive prompt.
//!
//! This is what the `feedback-prompt` binary runs: show the message and any
//! predefined options, collect a selection and free text, and write the
//! answer as `{"interactive_feedback": "..."}`.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::request::FeedbackResult;

/// Key under which the composed answer is stored.
pub const FEEDBACK_KEY: &str = "interactive_feedback";

/// Exit status of `feedback-prompt` when it found no terminal to ask on,
/// neither its own nor a launched emulator.
pub const EXIT_NO_TERMINAL: i32 = 3;

/// `--terminal` value that turns off the emulator fallback.
pub const TERMINAL_NONE: &str = "none";

/// Emulators tried, in order, when the prompt has no controlling terminal,
/// with the arguments that precede the command they should run.
const KNOWN_TERMINALS: &[(&str, &[&str])] = &[
    ("x-terminal-emulator", &["-e"]),
    ("gnome-terminal", &["--wait", "--"]),
    ("konsole", &["-e"]),
    ("alacritty", &["-e"]),
    ("kitty", &[]),
    ("xterm", &["-e"]),
];

/// A terminal emulator able to host the prompt in its own window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLauncher {
    pub program: String,
    pub args: Vec<String>,
}

impl TerminalLauncher {
    /// Known emulators get their own argument style; anything else `-e`.
    pub fn for_program(program: &str) -> Self {
        let name = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);
        let args = KNOWN_TERMINALS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, args)| args.iter().map(|a| a.to_string()).collect())
            .unwrap_or_else(|| vec!["-e".to_string()]);
        Self {
            program: program.to_string(),
            args,
        }
    }
}

/// Emulators to try when there is no terminal to prompt on.
///
/// `choice` is the `--terminal` flag: `"none"` disables the fallback, any
/// other value is used alone. Otherwise `$TERMINAL` comes first, then the
/// known emulators, and only when a graphical display is available.
pub fn terminal_candidates(
    choice: Option<&str>,
    env_terminal: Option<&str>,
    has_display: bool,
) -> Vec<TerminalLauncher> {
    match choice {
        Some(TERMINAL_NONE) => return Vec::new(),
        Some(program) => return vec![TerminalLauncher::for_program(program)],
        None => {}
    }
    if !has_display {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    if let Some(program) = env_terminal.filter(|p| !p.is_empty()) {
        candidates.push(TerminalLauncher::for_program(program));
    }
    for (program, _) in KNOWN_TERMINALS {
        if !candidates.iter().any(|c| c.program == *program) {
            candidates.push(TerminalLauncher::for_program(program));
        }
    }
    candidates
}

/// Parse a selection line such as `"1, 3"` into zero-based option indices.
///
/// Numbers are one-based and may be separated by commas and/or whitespace.
/// Duplicates are dropped, order of first appearance is kept.
pub fn parse_selection(input: &str, option_count: usize) -> std::result::Result<Vec<usize>, String> {
    let mut selected = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let n: usize = token
            .parse()
            .map_err(|_| format!("'{token}' is not a number"))?;
        if n == 0 || n > option_count {
            return Err(format!("{n} is not between 1 and {option_count}"));
        }
        if !selected.contains(&(n - 1)) {
            selected.push(n - 1);
        }
    }
    Ok(selected)
}

/// Selected options joined by `"; "`, then the free text, separated by a
/// blank line. Empty parts are left out.
pub fn compose_feedback(options: &[String], selected: &[usize], text: &str) -> String {
    let chosen: Vec<&str> = selected
        .iter()
        .filter_map(|&i| options.get(i).map(String::as_str))
        .collect();

    let mut parts = Vec::new();
    if !chosen.is_empty() {
        parts.push(chosen.join("; "));
    }
    let text = text.trim();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
    parts.join("\n\n")
}

/// Interactive session over any line reader and writer (normally `/dev/tty`).
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask `message`, returning the composed feedback text.
    pub fn ask(&mut self, message: &str, options: &[String]) -> io::Result<String> {
        writeln!(self.output)?;
        writeln!(self.output, "{message}")?;
        writeln!(self.output)?;

        let selected = if options.is_empty() {
            Vec::new()
        } else {
            for (i, option) in options.iter().enumerate() {
                writeln!(self.output, "  [{}] {}", i + 1, option)?;
            }
            self.read_selection(options.len())?
        };

        writeln!(
            self.output,
            "Feedback (finish with an empty line, leave empty to skip):"
        )?;
        let text = self.read_block()?;

        Ok(compose_feedback(options, &selected, &text))
    }

    fn read_selection(&mut self, option_count: usize) -> io::Result<Vec<usize>> {
        loop {
            write!(self.output, "Select options (e.g. 1,3), or press Enter for none: ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(Vec::new());
            };
            match parse_selection(&line, option_count) {
                Ok(selected) => return Ok(selected),
                Err(reason) => writeln!(self.output, "  {reason}, try again")?,
            }
        }
    }

    /// Lines up to the first empty line or end of input.
    fn read_block(&mut self) -> io::Result<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Build the result object the broker reads back.
pub fn feedback_result(text: &str) -> FeedbackResult {
    let mut map = Map::new();
    map.insert(FEEDBACK_KEY.to_string(), Value::String(text.to_string()));
    FeedbackResult::from(map)
}

/// Write the answer to `path`, creating its parent directory if needed.
pub fn write_result(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string(&feedback_result(text))?;
    std::fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selection_accepts_commas_and_spaces() {
        assert_eq!(parse_selection("1, 3 2", 3).unwrap(), vec![0, 2, 1]);
        assert_eq!(parse_selection("2,2", 3).unwrap(), vec![1]);
        assert!(parse_selection("   ", 3).unwrap().is_empty());
    }

    #[test]
    fn selection_rejects_out_of_range_and_garbage() {
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("red", 3).is_err());
    }

    #[test]
    fn compose_joins_options_and_text() {
        let options = opts(&["red", "green", "blue"]);
        assert_eq!(
            compose_feedback(&options, &[0, 2], "  darker please \n"),
            "red; blue\n\ndarker please"
        );
        assert_eq!(compose_feedback(&options, &[1], ""), "green");
        assert_eq!(compose_feedback(&options, &[], "just text"), "just text");
        assert_eq!(compose_feedback(&options, &[], ""), "");
    }

    #[test]
    fn terminal_session_retries_bad_selection() {
        let input = Cursor::new("9\n2\nlooks good\nship it\n\n");
        let mut output = Vec::new();
        let text = TerminalPrompt::new(input, &mut output)
            .ask("Pick a color", &opts(&["red", "blue"]))
            .unwrap();

        assert_eq!(text, "blue\n\nlooks good\nship it");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Pick a color"));
        assert!(shown.contains("[2] blue"));
        assert!(shown.contains("try again"));
    }

    #[test]
    fn terminal_session_without_options_reads_text_until_eof() {
        let input = Cursor::new("yes");
        let text = TerminalPrompt::new(input, io::sink())
            .ask("Confirm?", &[])
            .unwrap();
        assert_eq!(text, "yes");
    }

    #[test]
    fn no_display_means_no_fallback() {
        assert!(terminal_candidates(None, Some("kitty"), false).is_empty());
        assert!(terminal_candidates(Some("none"), None, true).is_empty());
    }

    #[test]
    fn explicit_terminal_is_used_even_without_display() {
        let candidates = terminal_candidates(Some("/usr/bin/gnome-terminal"), None, false);
        assert_eq!(
            candidates,
            vec![TerminalLauncher {
                program: "/usr/bin/gnome-terminal".into(),
                args: vec!["--wait".into(), "--".into()],
            }]
        );
        assert_eq!(TerminalLauncher::for_program("foot").args, vec!["-e".to_string()]);
    }

    #[test]
    fn env_terminal_goes_first_without_duplicates() {
        let candidates = terminal_candidates(None, Some("xterm"), true);
        assert_eq!(candidates[0].program, "xterm");
        assert_eq!(
            candidates.iter().filter(|c| c.program == "xterm").count(),
            1
        );
        assert_eq!(candidates.len(), KNOWN_TERMINALS.len());
    }

    #[test]
    fn write_result_creates_parent_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("out.json");
        write_result(&path, "blue").unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({ "interactive_feedback": "blue" }));
        assert_eq!(
            feedback_result("blue").get(FEEDBACK_KEY),
            Some(&json!("blue"))
        );
    }
}
