//! Custom error types for hotclick.
//!
//! This module provides structured error types using `thiserror` for better
//! error handling and more informative error messages.

use std::io;
use thiserror::Error;

/// Main error type for hotclick operations.
#[derive(Error, Debug)]
pub enum HotclickError {
    /// Error reading or parsing the configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing the configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// The specified key is invalid or unsupported.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Error registering or handling a global hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// The pointer reached a failsafe corner of the screen.
    #[error("failsafe triggered at ({x}, {y}), aborting")]
    FailsafeTriggered { x: i32, y: i32 },

    /// Error simulating a mouse click.
    #[error("failed to click at ({x}, {y}): {reason}")]
    ClickFailed { x: i32, y: i32, reason: String },

    /// The input simulation backend could not be used.
    #[error("input simulation unavailable: {0}")]
    Input(String),

    /// Error managing a configuration profile.
    #[error("profile error: {0}")]
    Profile(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for hotclick operations.
pub type Result<T> = std::result::Result<T, HotclickError>;

impl HotclickError {
    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Hotkey error.
    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }

    /// Create a new ClickFailed error.
    pub fn click_failed(x: i32, y: i32, reason: impl Into<String>) -> Self {
        Self::ClickFailed {
            x,
            y,
            reason: reason.into(),
        }
    }

    /// Create a new Input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create a new Profile error.
    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HotclickError::config_load("config.json", "missing field `repeat`");
        assert_eq!(
            err.to_string(),
            "failed to load config from 'config.json': missing field `repeat`"
        );

        let err = HotclickError::invalid_key("f9", "not in the supported key set");
        assert_eq!(
            err.to_string(),
            "invalid key 'f9': not in the supported key set"
        );

        let err = HotclickError::config_validation("repeat must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error: repeat must be at least 1"
        );

        let err = HotclickError::FailsafeTriggered { x: 0, y: 0 };
        assert_eq!(err.to_string(), "failsafe triggered at (0, 0), aborting");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: HotclickError = io_err.into();
        assert!(matches!(err, HotclickError::Io(_)));
    }
}
