//! # Auth Errors
//!
//! Error types for credential handling and token storage.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Credential and token-store errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Credential Errors
    // ==================

    /// Token is not a decodable JWT
    #[error("Malformed token")]
    MalformedToken,

    /// Token decoded but carries no usable role claim
    #[error("Token carries an unknown role: {0}")]
    UnknownRole(String),

    // ==================
    // Storage Errors
    // ==================

    /// Token file could not be read or written
    #[error("Token storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Whether the caller can fix this by logging in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, AuthError::MalformedToken | AuthError::UnknownRole(_))
    }
}
