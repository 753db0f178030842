pub mod settings;

pub use settings::*;

use std::path::PathBuf;

/// Returns the global config directory path: `~/.config/interactive-feedback/`
pub fn dirs_global() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("interactive-feedback")
}

/// Default config file: `~/.config/interactive-feedback/config.yml`
pub fn global_config_path() -> PathBuf {
    dirs_global().join("config.yml")
}
