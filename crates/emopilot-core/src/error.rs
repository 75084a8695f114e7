//! Error types for emopilot-core.
//!
//! Rejected player intents are not errors: they leave the session untouched and
//! return no events. The types here cover the collaborators around the state
//! machine (storage, configuration, deck construction, audio).

use std::path::PathBuf;
use thiserror::Error;

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Backing store cannot be reached at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Data directory could not be resolved or created
    #[error("Data directory error: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Deck construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeckError {
    #[error("boss pool is empty")]
    EmptyBossPool,
}

/// Audio backend errors. Never surfaced past the audio port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("no audio output available")]
    Unavailable,

    #[error("audio context is closed")]
    Closed,

    #[error("playback failed: {0}")]
    Playback(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}
