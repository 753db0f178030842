use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::broker::PromptCommand;
use crate::error::{FeedbackError, Result};

/// Name of the bundled prompt binary, looked up next to the running executable.
pub const DEFAULT_PROMPT_BIN: &str = "feedback-prompt";

/// Top-level configuration from `config.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which program shows the question to the human.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Directory for handoff files. Default: the system temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_dir: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is unset. Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PromptConfig::default(),
            handoff_dir: None,
            log_level: default_log_level(),
        }
    }
}

/// Prompt program settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Program to run. Default: the bundled `feedback-prompt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    /// Arguments placed before `--prompt`, e.g. a script for an interpreter.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| FeedbackError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| FeedbackError::ConfigParse {
            path: PathBuf::from("<memory>"),
            reason: e.to_string(),
        })
    }

    /// Resolve the prompt program, falling back to the bundled binary.
    pub fn prompt_command(&self) -> PromptCommand {
        let program = self
            .prompt
            .command
            .clone()
            .unwrap_or_else(default_prompt_program);
        PromptCommand::new(program).with_args(self.prompt.args.iter().cloned())
    }
}

/// `feedback-prompt` beside the current executable, or a bare name resolved
/// through `PATH` when the executable location is unknown.
pub fn default_prompt_program() -> PathBuf {
    let file_name = format!("{}{}", DEFAULT_PROMPT_BIN, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
