//! Custom error types for driveback
//!
//! Every failure aborts the run, so the taxonomy exists to produce a clear
//! one-line message per category rather than to drive recovery.

use thiserror::Error;

/// The main error type for driveback operations
#[derive(Error, Debug)]
pub enum DrivebackError {
    /// Bad or missing command line arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authorization abandoned or rejected
    #[error("Authorization error: {0}")]
    Auth(String),

    /// Remote entity not found
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A remote call failed at the protocol layer
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local file I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl DrivebackError {
    /// Create a "not found" error for remote folders
    pub fn folder_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Remote folder",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Check if this is an authorization error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<std::io::Error> for DrivebackError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DrivebackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for DrivebackError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for driveback operations
pub type DrivebackResult<T> = Result<T, DrivebackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DrivebackError::Usage("The source directory (\"-s\") is not defined.".into());
        assert_eq!(
            err.to_string(),
            "Usage error: The source directory (\"-s\") is not defined."
        );
    }

    #[test]
    fn test_folder_not_found() {
        let err = DrivebackError::folder_not_found("Backups");
        assert_eq!(err.to_string(), "Remote folder not found: Backups");
        assert!(err.is_not_found());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DrivebackError = io_err.into();
        assert!(matches!(err, DrivebackError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DrivebackError = json_err.into();
        assert!(matches!(err, DrivebackError::Json(_)));
    }
}
