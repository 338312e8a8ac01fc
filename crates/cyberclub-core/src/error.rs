//! Unified error types for CyberClub.

use thiserror::Error;

/// Result type alias using ClubError.
pub type Result<T> = std::result::Result<T, ClubError>;

#[derive(Error, Debug)]
pub enum ClubError {
    // Content errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    // Channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl ClubError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures a scheduler job should contain rather than escalate.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Http(_) | Self::Timeout(_) | Self::Channel(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClubError::NotFound("event 'CTF Night'".into());
        assert!(err.to_string().contains("CTF Night"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = ClubError::not_found("test");
        assert!(matches!(e1, ClubError::NotFound(_)));

        let e2 = ClubError::validation("test");
        assert!(matches!(e2, ClubError::Validation(_)));

        let e3 = ClubError::store("test");
        assert!(matches!(e3, ClubError::Store(_)));

        let e4 = ClubError::config("test");
        assert!(matches!(e4, ClubError::Config(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClubError::Timeout("request".into()).is_transient());
        assert!(ClubError::Http("502".into()).is_transient());
        assert!(!ClubError::Validation("bad input".into()).is_transient());
        assert!(!ClubError::Config("missing token".into()).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClubError = io_err.into();
        assert!(matches!(err, ClubError::Io(_)));
    }
}
