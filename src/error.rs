//! Error types for clickguard.
//!
//! The engine itself never returns errors: missing sounds, rejected
//! playback, and failed fullscreen requests degrade silently and surface
//! through the [`Event`](crate::Event) stream instead. Configuration is the
//! only fallible entry point.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for ConfigError
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
