mod config;
pub mod database;

pub use config::{Config, SoundConfig, UiConfig};
pub use database::{Database, Sound};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/mindful[-dev]/` based on MINDFUL_ENV.
///
/// Set MINDFUL_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDFUL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindful-dev")
    } else {
        base_dir.join("mindful")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
