//! Turns a [`FeedbackRequest`] into a [`FeedbackResult`] by running the
//! interactive prompt as a child process and reading back its handoff file.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::config::{Config, DEFAULT_PROMPT_BIN};
use crate::error::{FeedbackError, Result};
use crate::handoff::ResultHandoff;
use crate::prompt::EXIT_NO_TERMINAL;
use crate::request::{FeedbackRequest, FeedbackResult};

/// Program (plus leading arguments) that implements the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PromptCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Whether this runs the `feedback-prompt` binary shipped with the crate.
    pub fn is_bundled(&self) -> bool {
        self.program.file_stem().and_then(|s| s.to_str()) == Some(DEFAULT_PROMPT_BIN)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Synchronous, single-shot feedback broker. Holds no per-request state, so
/// one instance can serve overlapping calls.
#[derive(Debug, Clone)]
pub struct FeedbackBroker {
    prompt: PromptCommand,
    handoff_dir: Option<PathBuf>,
}

impl FeedbackBroker {
    pub fn new(prompt: PromptCommand) -> Self {
        Self {
            prompt,
            handoff_dir: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            prompt: config.prompt_command(),
            handoff_dir: config.handoff_dir.clone(),
        }
    }

    /// Place handoff files in `dir` instead of the system temp dir.
    pub fn with_handoff_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.handoff_dir = Some(dir.into());
        self
    }

    pub fn prompt(&self) -> &PromptCommand {
        &self.prompt
    }

    /// Ask the human and block until the prompt process exits.
    ///
    /// The handoff file is removed before this returns, on success and on
    /// every error path.
    pub fn request_feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResult> {
        let handoff = ResultHandoff::create(self.handoff_dir.as_deref())?;

        tracing::info!(
            handoff = %handoff.path().display(),
            options = request.options.as_slice().len(),
            "requesting feedback"
        );

        let outcome = self.run_prompt(request, &handoff);
        if let Err(e) = handoff.remove() {
            tracing::warn!("failed to remove handoff file: {}", e);
        }

        let result = outcome?;

        tracing::info!(keys = result.len(), "feedback received");
        Ok(result)
    }

    fn run_prompt(&self, request: &FeedbackRequest, handoff: &ResultHandoff) -> Result<FeedbackResult> {
        let mut cmd = self.build_command(request, handoff);
        tracing::debug!(command = ?cmd, "launching feedback prompt");

        let status = cmd.status().map_err(|e| {
            tracing::warn!(
                program = %self.prompt.program.display(),
                "failed to spawn feedback prompt: {}",
                e
            );
            FeedbackError::LaunchFailure {
                code: None,
                reason: format!("{}: {}", self.prompt.program.display(), e),
            }
        })?;

        if !status.success() {
            let no_terminal = self.prompt.is_bundled() && status.code() == Some(EXIT_NO_TERMINAL);
            if no_terminal {
                tracing::warn!(
                    program = %self.prompt.program.display(),
                    "feedback prompt found no terminal; set prompt.command to a prompt that \
                     opens its own window, or prompt.args to [\"--terminal\", \"<emulator>\"]"
                );
            }
            tracing::warn!(%status, "feedback prompt exited unsuccessfully");
            return Err(FeedbackError::LaunchFailure {
                code: status.code(),
                reason: describe_status(status, no_terminal),
            });
        }

        handoff.read()
    }

    /// Command line for one request. No shell is involved; message and
    /// options reach the prompt as separate argv entries.
    fn build_command(&self, request: &FeedbackRequest, handoff: &ResultHandoff) -> Command {
        let mut cmd = Command::new(&self.prompt.program);
        cmd.args(&self.prompt.args)
            .arg("--prompt")
            .arg(&request.message)
            .arg("--output-file")
            .arg(handoff.path())
            .arg("--predefined-options")
            .arg(request.options.encode())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

fn describe_status(status: ExitStatus, no_terminal: bool) -> String {
    if no_terminal {
        return format!(
            "prompt exited with status {EXIT_NO_TERMINAL}: no terminal available to ask the user"
        );
    }
    if let Some(code) = status.code() {
        return format!("prompt exited with status {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("prompt killed by signal {signal}");
        }
    }
    format!("prompt terminated abnormally ({status})")
}
