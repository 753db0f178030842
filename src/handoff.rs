use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{FeedbackError, Result};
use crate::request::FeedbackResult;

const HANDOFF_PREFIX: &str = "feedback-";
const HANDOFF_SUFFIX: &str = ".json";

/// Temp file through which the prompt process hands its answer back.
///
/// The file is created empty and exclusively, so two live handoffs never share
/// a path. It is removed when the handoff is dropped, whatever happened to it
/// in between.
#[derive(Debug)]
pub struct ResultHandoff {
    path: TempPath,
}

impl ResultHandoff {
    /// Allocate in `dir`, or the system temp dir when `None`.
    pub fn create(dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(HANDOFF_PREFIX).suffix(HANDOFF_SUFFIX);

        let file = match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| FeedbackError::Handoff {
                    reason: format!("cannot create handoff dir {}: {e}", dir.display()),
                })?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .map_err(|e| FeedbackError::Handoff {
            reason: format!("failed to allocate handoff file: {e}"),
        })?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse what the prompt wrote. Must be a JSON object.
    pub fn read(&self) -> Result<FeedbackResult> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| self.parse_failure(e.to_string()))?;
        serde_json::from_str::<FeedbackResult>(&contents)
            .map_err(|e| self.parse_failure(e.to_string()))
    }

    /// Delete the file now and report any error other than "already gone".
    pub fn remove(self) -> Result<()> {
        match self.path.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn parse_failure(&self, reason: String) -> FeedbackError {
        FeedbackError::ResultParseFailure {
            path: PathBuf::from(self.path()),
            reason,
        }
    }
}
