//! Terminal outcome of a role transition.
//!
//! The only programmatic decision a caller has to make is clean vs.
//! inconsistent; the reasons are carried as data for messaging and support.

use std::fmt;

use crate::profile::Profile;
use crate::remote::RemoteError;

/// Message shown when the account is left in an inconsistent state.
pub const SUPPORT_MESSAGE: &str =
    "Something went wrong with your account state. Please contact support.";

/// Remote step of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionStep {
    /// Set the target role
    Elevate,
    /// Create the dependent profile
    Materialize,
    /// Set the original role back
    Compensate,
}

impl TransitionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elevate => "elevate",
            Self::Materialize => "materialize",
            Self::Compensate => "compensate",
        }
    }
}

impl fmt::Display for TransitionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub step: TransitionStep,
    pub summary: &'static str,
    pub error: RemoteError,
}

impl FailureReason {
    pub fn new(step: TransitionStep, error: RemoteError) -> Self {
        let summary = match step {
            TransitionStep::Elevate => "role elevation rejected",
            TransitionStep::Materialize => "profile creation failed",
            TransitionStep::Compensate => "role revert failed",
        };
        Self {
            step,
            summary,
            error,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.error)
    }
}

/// Result of `RoleTransitionCoordinator::promote`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Role changed and profile created.
    Success(Profile),

    /// Role never changed, or was fully reverted. Safe to retry.
    CleanFailure(FailureReason),

    /// Role changed, profile missing, revert failed.
    /// The elevated credential stays installed.
    InconsistentFailure {
        materialize: FailureReason,
        revert: FailureReason,
    },
}

impl TransitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_clean_failure(&self) -> bool {
        matches!(self, Self::CleanFailure(_))
    }

    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Self::InconsistentFailure { .. })
    }

    /// Whether offering an immediate retry is appropriate.
    pub fn is_retryable(&self) -> bool {
        self.is_clean_failure()
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Success(profile) => Some(profile),
            _ => None,
        }
    }

    /// The reason that caused the transition to fail, if it did.
    pub fn primary_reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success(_) => None,
            Self::CleanFailure(reason) => Some(reason),
            Self::InconsistentFailure { materialize, .. } => Some(materialize),
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Success(_) => "Registration complete.".to_string(),
            Self::CleanFailure(reason) => reason.to_string(),
            Self::InconsistentFailure { .. } => SUPPORT_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(profile) => write!(f, "success (profile {})", profile.id),
            Self::CleanFailure(reason) => write!(f, "clean failure: {}", reason),
            Self::InconsistentFailure {
                materialize,
                revert,
            } => write!(f, "inconsistent failure: {}; {}", materialize, revert),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_summaries_per_step() {
        let reason = FailureReason::new(
            TransitionStep::Elevate,
            RemoteError::Unauthorized("token expired".into()),
        );
        assert_eq!(reason.summary, "role elevation rejected");
        assert_eq!(
            reason.to_string(),
            "role elevation rejected: unauthorized: token expired"
        );
    }

    #[test]
    fn test_inconsistent_is_not_retryable() {
        let outcome = TransitionOutcome::InconsistentFailure {
            materialize: FailureReason::new(
                TransitionStep::Materialize,
                RemoteError::Validation("logo missing".into()),
            ),
            revert: FailureReason::new(
                TransitionStep::Compensate,
                RemoteError::Timeout {
                    after: Duration::from_secs(10),
                },
            ),
        };
        assert!(!outcome.is_retryable());
        assert_eq!(outcome.user_message(), SUPPORT_MESSAGE);
        assert_eq!(
            outcome.primary_reason().map(|r| r.step),
            Some(TransitionStep::Materialize)
        );

        let display = outcome.to_string();
        assert!(display.contains("logo missing"));
        assert!(display.contains("timed out after 10000ms"));
    }

    #[test]
    fn test_clean_failure_shows_reason() {
        let outcome = TransitionOutcome::CleanFailure(FailureReason::new(
            TransitionStep::Materialize,
            RemoteError::Conflict("profile exists".into()),
        ));
        assert!(outcome.is_retryable());
        assert_eq!(
            outcome.user_message(),
            "profile creation failed: conflict: profile exists"
        );
    }
}
