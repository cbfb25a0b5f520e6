//! # Transition Errors
//!
//! Synchronous rejections raised before any remote call is made. Failures of
//! the remote steps themselves are never errors; they become a
//! `TransitionOutcome`.

use thiserror::Error;

use crate::auth::{AuthError, RoleState};
use crate::profile::ProfileKind;

/// Result type for coordinator operations
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Reasons a transition is refused up front.
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// Another transition for this subject is in flight
    #[error("a role transition is already in progress ({state})")]
    AlreadyInProgress { state: &'static str },

    /// A previous transition left the account elevated without a profile
    #[error("account is elevated to {elevated} without a profile (was {original}); contact support")]
    Stuck {
        original: RoleState,
        elevated: RoleState,
    },

    /// No credential is installed
    #[error("not logged in")]
    NotAuthenticated,

    /// Subject already holds the requested role
    #[error("account already has role {0}")]
    AlreadyInRole(RoleState),

    /// Requested role has no profile to create
    #[error("role {0} has no profile to create")]
    NoProfileForRole(RoleState),

    /// Draft does not match the requested role
    #[error("role {role} needs a {expected} profile, got a {draft} draft")]
    DraftMismatch {
        role: RoleState,
        expected: ProfileKind,
        draft: ProfileKind,
    },

    /// State machine refused a transition
    #[error("forbidden transition: {from} → {to}")]
    ForbiddenTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Resolution requested while not stuck
    #[error("no stuck transition to resolve")]
    NotStuck,

    /// Installed credential could not be read
    #[error(transparent)]
    Credential(#[from] AuthError),

    /// Stuck marker could not be read or written
    #[error("stuck marker error: {0}")]
    Marker(String),
}

impl TransitionError {
    pub fn forbidden(from: &'static str, to: &'static str) -> Self {
        Self::ForbiddenTransition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TransitionError::Stuck {
            original: RoleState::User,
            elevated: RoleState::Organizer,
        };
        assert!(err.to_string().contains("contact support"));

        let err = TransitionError::DraftMismatch {
            role: RoleState::Organizer,
            expected: ProfileKind::Organizer,
            draft: ProfileKind::Player,
        };
        assert_eq!(
            err.to_string(),
            "role ORGANIZER needs a ORGANIZER profile, got a PLAYER draft"
        );
    }
}
