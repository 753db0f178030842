use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// The prompt could not be started, or it exited unsuccessfully.
    /// `code` is `None` when the child never ran or was killed by a signal.
    #[error("failed to launch feedback prompt: {reason}")]
    LaunchFailure { code: Option<i32>, reason: String },

    #[error("could not read feedback result from {path}: {reason}")]
    ResultParseFailure { path: PathBuf, reason: String },

    #[error("handoff file error: {reason}")]
    Handoff { reason: String },

    #[error("mcp transport error: {reason}")]
    Transport { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedbackError {
    /// Short machine-readable tag, used in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LaunchFailure { .. } => "launch_failure",
            Self::ResultParseFailure { .. } => "result_parse_failure",
            Self::Handoff { .. } => "handoff",
            Self::Transport { .. } => "transport",
            Self::ConfigParse { .. } => "config_parse",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Exit code of the prompt process, if this is a launch failure that has one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::LaunchFailure { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
