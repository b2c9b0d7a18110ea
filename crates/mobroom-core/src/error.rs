//! Core error types for mobroom-core.
//!
//! Every failure leaves the session in its last valid state, so none of
//! these errors is fatal to the process. Callers decide whether to surface
//! them (validation), log them (not found) or react to them (empty roster).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mobroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected input; state is unchanged
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lookup of an unknown identifier
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// No roles can be assigned because the roster has no members.
    #[error("Roster is empty; no driver or navigator can be assigned")]
    EmptyRoster,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn member_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: "member",
            id: id.into(),
        }
    }

    /// True for errors the caller should show to the user as input feedback.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Member name blank after trimming
    #[error("Member name must not be empty")]
    EmptyName,

    /// Duration below the one minute floor
    #[error("{field} must be at least {min_ms} ms (got {value_ms} ms)")]
    DurationTooShort {
        field: &'static str,
        value_ms: i64,
        min_ms: u64,
    },

    /// Duration not on a whole minute
    #[error("{field} must be a whole number of minutes (got {value_ms} ms)")]
    NotWholeMinute { field: &'static str, value_ms: i64 },

    /// Rotations per break below one
    #[error("rotations per break must be at least 1 (got {0})")]
    RotationsBelowOne(i64),

    /// Rotations per break beyond what can be counted
    #[error("rotations per break must be at most {max} (got {0})", max = u32::MAX)]
    RotationsOutOfRange(i64),

    /// Start requested while a session is already active
    #[error("A session is already running")]
    SessionAlreadyRunning,

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::EmptyName.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation error: Member name must not be empty");
    }

    #[test]
    fn not_found_names_the_kind() {
        let err = CoreError::member_not_found("abc");
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "member not found: abc");
    }
}
