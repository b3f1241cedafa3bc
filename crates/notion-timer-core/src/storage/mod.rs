mod config;
pub mod state_store;

pub use config::{Config, Credentials, NotionConfig, PropertyNames, DATABASE_ID_ENV, TOKEN_ENV};
pub use state_store::{FileStateStore, MemoryStateStore, StateStore, STATE_FILE_NAME};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/notion-timer[-dev]/` based on NOTION_TIMER_ENV.
///
/// Set NOTION_TIMER_ENV=dev to use a development config directory. The
/// directory is not created here; saving the config does that.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".config");

    let env = std::env::var("NOTION_TIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("notion-timer-dev")
    } else {
        base_dir.join("notion-timer")
    };

    Ok(dir)
}
