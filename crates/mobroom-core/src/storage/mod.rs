mod config;

pub use config::{Config, RosterSettings, SessionSettings, WindowSettings};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/mobroom[-dev]/` based on MOBROOM_ENV.
///
/// Set MOBROOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MOBROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mobroom-dev")
    } else {
        base_dir.join("mobroom")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
