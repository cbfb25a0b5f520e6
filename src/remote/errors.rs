//! # Remote Errors
//!
//! Failures reported by the backend role service or the transport to it.

use std::time::Duration;

use thiserror::Error;

/// Result type for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Backend role service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Caller's credential is missing, invalid or expired
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Target role is not a legal transition from the current one
    #[error("invalid role transition: {0}")]
    InvalidRole(String),

    /// A profile field is missing or invalid
    #[error("validation failed: {0}")]
    Validation(String),

    /// A profile already exists for this subject
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-success status
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, DNS or TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No response within the step deadline
    #[error("timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },
}

impl RemoteError {
    /// Short machine-readable tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidRole(_) => "invalid_role",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Timeout { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RemoteError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "timed out after 1500ms");

        let err = RemoteError::Status {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "backend returned 503: maintenance");
    }

    #[test]
    fn test_tags() {
        assert_eq!(RemoteError::Conflict("x".into()).tag(), "conflict");
        assert_eq!(RemoteError::Transport("x".into()).tag(), "transport");
    }
}
