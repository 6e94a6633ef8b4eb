//! Error types for mindful-core.
//!
//! One thiserror hierarchy for the whole library. Audio errors are a
//! special case: the timer path never propagates them, it logs them and
//! keeps running silently.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for mindful-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Audio playback errors. Always treated as non-fatal by callers.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device available: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to open sound file {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    #[error("Failed to decode sound file {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    #[error("Playback request failed: {0}")]
    PlaybackFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
