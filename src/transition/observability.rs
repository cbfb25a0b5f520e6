//! Transition Observability
//!
//! Every transition attempt emits a start event, one event per remote step
//! result, and nothing else. Events describe what happened; they never
//! decide what happens.

use uuid::Uuid;

use crate::auth::RoleState;
use crate::profile::ProfileKind;
use crate::remote::RemoteError;

/// Lifecycle events of a role transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// A transition claimed the subject's slot.
    Requested {
        attempt_id: Uuid,
        from: RoleState,
        to: RoleState,
        kind: ProfileKind,
    },

    /// A request was refused before any remote call.
    Rejected { to: RoleState, reason: String },

    /// Role change confirmed; new credential installed.
    Elevated { attempt_id: Uuid, role: RoleState },

    /// Role change failed.
    ElevationFailed { attempt_id: Uuid, error: RemoteError },

    /// Profile created.
    Materialized { attempt_id: Uuid, profile_id: String },

    /// Profile creation failed; compensation follows.
    MaterializeFailed { attempt_id: Uuid, error: RemoteError },

    /// Compensation restored the original role.
    Reverted { attempt_id: Uuid, role: RoleState },

    /// Compensation failed; account left elevated without a profile.
    RevertFailed {
        attempt_id: Uuid,
        elevated: RoleState,
        error: RemoteError,
    },

    /// The transition was dropped before reaching an outcome.
    Abandoned { attempt_id: Uuid, state: &'static str },

    /// A stuck account was repaired out of band.
    Resolved { role: RoleState },
}

impl TransitionEvent {
    /// Event name for logs.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Requested { .. } => "role_transition.requested",
            Self::Rejected { .. } => "role_transition.rejected",
            Self::Elevated { .. } => "role_transition.elevated",
            Self::ElevationFailed { .. } => "role_transition.elevation_failed",
            Self::Materialized { .. } => "role_transition.materialized",
            Self::MaterializeFailed { .. } => "role_transition.materialize_failed",
            Self::Reverted { .. } => "role_transition.reverted",
            Self::RevertFailed { .. } => "role_transition.revert_failed",
            Self::Abandoned { .. } => "role_transition.abandoned",
            Self::Resolved { .. } => "role_transition.resolved",
        }
    }

    /// Emit as a structured `tracing` event.
    pub fn emit(&self) {
        let event = self.event_name();
        match self {
            Self::Requested {
                attempt_id,
                from,
                to,
                kind,
            } => tracing::info!(event, %attempt_id, %from, %to, %kind, "role transition requested"),
            Self::Rejected { to, reason } => {
                tracing::info!(event, %to, reason = reason.as_str(), "role transition rejected")
            }
            Self::Elevated { attempt_id, role } => {
                tracing::info!(event, %attempt_id, %role, "role elevated")
            }
            Self::ElevationFailed { attempt_id, error } => tracing::warn!(
                event,
                %attempt_id,
                error = %error,
                kind = error.tag(),
                "role elevation failed"
            ),
            Self::Materialized {
                attempt_id,
                profile_id,
            } => tracing::info!(event, %attempt_id, profile_id = profile_id.as_str(), "profile created"),
            Self::MaterializeFailed { attempt_id, error } => tracing::warn!(
                event,
                %attempt_id,
                error = %error,
                kind = error.tag(),
                "profile creation failed, reverting role"
            ),
            Self::Reverted { attempt_id, role } => {
                tracing::info!(event, %attempt_id, %role, "role reverted")
            }
            Self::RevertFailed {
                attempt_id,
                elevated,
                error,
            } => tracing::error!(
                event,
                %attempt_id,
                %elevated,
                error = %error,
                kind = error.tag(),
                "role revert failed, account left elevated without a profile"
            ),
            Self::Abandoned { attempt_id, state } => tracing::error!(
                event,
                %attempt_id,
                state = *state,
                "role transition dropped before completion"
            ),
            Self::Resolved { role } => tracing::info!(event, %role, "stuck transition resolved"),
        }
    }
}
