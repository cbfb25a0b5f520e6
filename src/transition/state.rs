//! Role Transition State Machine
//!
//! ```text
//! Idle ─► Elevating ─┬─► ElevatedNoProfile ─► Materializing ─┬─► Done
//!  ▲                 │                                       │
//!  └─────────────────┘ (elevation rejected)                  ▼
//!  ▲                                              RevertingAfterFailure
//!  └──────────────────────── (reverted) ◄────────────┤
//!                                                    └─► Stuck
//! ```
//!
//! - States are explicit and enumerable
//! - Every transition is a consuming method; anything else is forbidden
//! - Only `Idle` and `Done` accept a new transition
//! - `Stuck` is left only by explicit resolution (or an allowed retry that
//!   succeeds; a failed retry is restored to the same `Stuck`)

use super::errors::{TransitionError, TransitionResult};
use crate::auth::RoleState;

/// Coordinator state for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition in flight; role confirmed.
    Idle { role: RoleState },

    /// Role change requested, not yet confirmed.
    Elevating { from: RoleState, to: RoleState },

    /// Elevated credential installed; profile not created yet.
    ElevatedNoProfile { from: RoleState, to: RoleState },

    /// Profile creation in flight.
    Materializing { from: RoleState, to: RoleState },

    /// Profile creation failed; compensating role change in flight.
    RevertingAfterFailure { from: RoleState, to: RoleState },

    /// Transition completed; elevated credential stays active.
    Done { role: RoleState },

    /// Elevated without a profile and the revert failed.
    /// Needs out-of-band intervention.
    Stuck {
        original: RoleState,
        elevated: RoleState,
    },
}

impl TransitionState {
    /// Initial state for a subject whose role is known.
    pub fn new(role: RoleState) -> Self {
        Self::Idle { role }
    }

    /// State name for logs and output.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "Idle",
            Self::Elevating { .. } => "Elevating",
            Self::ElevatedNoProfile { .. } => "ElevatedNoProfile",
            Self::Materializing { .. } => "Materializing",
            Self::RevertingAfterFailure { .. } => "RevertingAfterFailure",
            Self::Done { .. } => "Done",
            Self::Stuck { .. } => "Stuck",
        }
    }

    /// A transition is running and owns the credential.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Elevating { .. }
                | Self::ElevatedNoProfile { .. }
                | Self::Materializing { .. }
                | Self::RevertingAfterFailure { .. }
        )
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, Self::Stuck { .. })
    }

    /// Role the currently installed credential is believed to encode.
    pub fn current_role(&self) -> RoleState {
        match self {
            Self::Idle { role } | Self::Done { role } => *role,
            // Credential not swapped yet.
            Self::Elevating { from, .. } => *from,
            Self::ElevatedNoProfile { to, .. }
            | Self::Materializing { to, .. }
            | Self::RevertingAfterFailure { to, .. } => *to,
            Self::Stuck { elevated, .. } => *elevated,
        }
    }

    // =========================================================================
    // ALLOWED TRANSITIONS
    // =========================================================================

    /// Idle | Done → Elevating
    pub fn begin(self, to: RoleState) -> TransitionResult<Self> {
        match self {
            Self::Idle { role } | Self::Done { role } => Ok(Self::Elevating { from: role, to }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Elevating")),
        }
    }

    /// Stuck → Elevating, starting from the installed elevated role.
    pub fn retry_from_stuck(self, to: RoleState) -> TransitionResult<Self> {
        match self {
            Self::Stuck { elevated, .. } => Ok(Self::Elevating { from: elevated, to }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Elevating")),
        }
    }

    /// Elevating → Idle
    ///
    /// Role change rejected; nothing changed.
    pub fn elevation_rejected(self) -> TransitionResult<Self> {
        match self {
            Self::Elevating { from, .. } => Ok(Self::Idle { role: from }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Idle")),
        }
    }

    /// Elevating → ElevatedNoProfile
    ///
    /// Role change confirmed and the new credential installed.
    pub fn elevated(self) -> TransitionResult<Self> {
        match self {
            Self::Elevating { from, to } => Ok(Self::ElevatedNoProfile { from, to }),
            _ => Err(TransitionError::forbidden(self.state_name(), "ElevatedNoProfile")),
        }
    }

    /// ElevatedNoProfile → Materializing
    pub fn begin_materialize(self) -> TransitionResult<Self> {
        match self {
            Self::ElevatedNoProfile { from, to } => Ok(Self::Materializing { from, to }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Materializing")),
        }
    }

    /// Materializing → Done
    pub fn materialized(self) -> TransitionResult<Self> {
        match self {
            Self::Materializing { to, .. } => Ok(Self::Done { role: to }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Done")),
        }
    }

    /// Materializing → RevertingAfterFailure
    pub fn materialize_failed(self) -> TransitionResult<Self> {
        match self {
            Self::Materializing { from, to } => Ok(Self::RevertingAfterFailure { from, to }),
            _ => Err(TransitionError::forbidden(
                self.state_name(),
                "RevertingAfterFailure",
            )),
        }
    }

    /// RevertingAfterFailure → Idle
    ///
    /// Back at the pre-transition role; safe to retry.
    pub fn reverted(self) -> TransitionResult<Self> {
        match self {
            Self::RevertingAfterFailure { from, .. } => Ok(Self::Idle { role: from }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Idle")),
        }
    }

    /// RevertingAfterFailure → Stuck
    ///
    /// `original` is the role held before the account first got stuck;
    /// for a fresh attempt it equals `from`.
    pub fn revert_failed(self, original: RoleState) -> TransitionResult<Self> {
        match self {
            Self::RevertingAfterFailure { to, .. } => Ok(Self::Stuck {
                original,
                elevated: to,
            }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Stuck")),
        }
    }

    /// Elevating | RevertingAfterFailure → Stuck
    ///
    /// A retry out of `Stuck` ended back at the role it started from; the
    /// account is as inconsistent as before.
    pub fn restore_stuck(self, original: RoleState) -> TransitionResult<Self> {
        match self {
            Self::Elevating { from, .. } | Self::RevertingAfterFailure { from, .. } => {
                Ok(Self::Stuck {
                    original,
                    elevated: from,
                })
            }
            _ => Err(TransitionError::forbidden(self.state_name(), "Stuck")),
        }
    }

    /// Any in-flight state → Stuck
    ///
    /// The transition stopped before a terminal outcome was observed, so
    /// the server-side role is unknown.
    pub fn abandon(self, original: RoleState) -> TransitionResult<Self> {
        match self {
            Self::Elevating { to, .. }
            | Self::ElevatedNoProfile { to, .. }
            | Self::Materializing { to, .. }
            | Self::RevertingAfterFailure { to, .. } => Ok(Self::Stuck {
                original,
                elevated: to,
            }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Stuck")),
        }
    }

    /// Stuck → Idle
    ///
    /// The account state was repaired out of band and `role` confirmed.
    pub fn resolve(self, role: RoleState) -> TransitionResult<Self> {
        match self {
            Self::Stuck { .. } => Ok(Self::Idle { role }),
            _ => Err(TransitionError::forbidden(self.state_name(), "Idle")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RoleState::{Organizer, User};

    #[test]
    fn test_success_path() {
        let state = TransitionState::new(User);
        assert!(!state.is_in_flight());

        let state = state.begin(Organizer).unwrap();
        assert_eq!(state.state_name(), "Elevating");
        assert!(state.is_in_flight());
        assert_eq!(state.current_role(), User);

        let state = state.elevated().unwrap();
        assert_eq!(state.current_role(), Organizer);
        let state = state.begin_materialize().unwrap().materialized().unwrap();

        assert_eq!(state, TransitionState::Done { role: Organizer });
        assert!(!state.is_in_flight());
    }

    #[test]
    fn test_elevation_rejected_returns_idle() {
        let state = TransitionState::new(User)
            .begin(Organizer)
            .unwrap()
            .elevation_rejected()
            .unwrap();
        assert_eq!(state, TransitionState::Idle { role: User });
    }

    #[test]
    fn test_compensation_paths() {
        let reverting = TransitionState::new(User)
            .begin(Organizer)
            .and_then(TransitionState::elevated)
            .and_then(TransitionState::begin_materialize)
            .and_then(TransitionState::materialize_failed)
            .unwrap();
        assert_eq!(reverting.state_name(), "RevertingAfterFailure");

        assert_eq!(
            reverting.clone().reverted().unwrap(),
            TransitionState::Idle { role: User }
        );

        let stuck = reverting.revert_failed(User).unwrap();
        assert_eq!(
            stuck,
            TransitionState::Stuck {
                original: User,
                elevated: Organizer
            }
        );
        assert!(stuck.is_stuck());
        assert_eq!(stuck.current_role(), Organizer);
    }

    #[test]
    fn test_forbidden_transitions() {
        let idle = TransitionState::new(User);
        assert!(idle.clone().elevated().is_err());
        assert!(idle.clone().materialized().is_err());
        assert!(idle.clone().resolve(User).is_err());
        assert!(idle.clone().abandon(User).is_err());
        assert!(idle.clone().restore_stuck(User).is_err());

        let elevating = idle.begin(Organizer).unwrap();
        assert!(elevating.clone().begin(Organizer).is_err());
        assert!(elevating.clone().reverted().is_err());

        match elevating.begin_materialize() {
            Err(TransitionError::ForbiddenTransition { from, to }) => {
                assert_eq!(from, "Elevating");
                assert_eq!(to, "Materializing");
            }
            other => panic!("expected ForbiddenTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_stuck_retry_starts_from_elevated_role() {
        let stuck = TransitionState::Stuck {
            original: User,
            elevated: Organizer,
        };
        assert!(stuck.clone().begin(RoleState::Player).is_err());

        let retry = stuck.retry_from_stuck(RoleState::Player).unwrap();
        assert_eq!(
            retry,
            TransitionState::Elevating {
                from: Organizer,
                to: RoleState::Player
            }
        );
    }

    #[test]
    fn test_failed_retry_keeps_original_role() {
        let stuck = TransitionState::Stuck {
            original: User,
            elevated: Organizer,
        };

        let rejected = stuck
            .clone()
            .retry_from_stuck(RoleState::Player)
            .and_then(|s| s.restore_stuck(User))
            .unwrap();
        assert_eq!(rejected, stuck);

        let reverting = stuck
            .clone()
            .retry_from_stuck(RoleState::Player)
            .and_then(TransitionState::elevated)
            .and_then(TransitionState::begin_materialize)
            .and_then(TransitionState::materialize_failed)
            .unwrap();
        assert_eq!(reverting.clone().restore_stuck(User).unwrap(), stuck);
        assert_eq!(
            reverting.revert_failed(User).unwrap(),
            TransitionState::Stuck {
                original: User,
                elevated: RoleState::Player
            }
        );
    }

    #[test]
    fn test_abandon_and_resolve() {
        let stuck = TransitionState::new(User)
            .begin(Organizer)
            .unwrap()
            .abandon(User)
            .unwrap();
        assert!(stuck.is_stuck());

        let idle = stuck.resolve(Organizer).unwrap();
        assert_eq!(idle, TransitionState::Idle { role: Organizer });
    }
}
