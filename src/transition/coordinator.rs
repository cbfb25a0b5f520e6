//! Role Transition Coordinator
//!
//! Drives promote-then-create with a compensating rollback:
//! 1. Elevate: set the target role, install the returned credential
//! 2. Materialize: create the dependent profile with that credential
//! 3. Compensate (only after 2 fails): set the original role back once
//!
//! Non-responsibilities:
//! - Does not validate draft fields
//! - Does not special-case remote status codes
//! - Does not retry anything beyond the single compensating call
//!
//! One transition per subject at a time. A coordinator serves exactly one
//! subject: the one whose credential lives in its token store.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::config::TransitionConfig;
use super::errors::{TransitionError, TransitionResult};
use super::marker::{StuckMarker, StuckRecord};
use super::observability::TransitionEvent;
use super::outcome::{FailureReason, TransitionOutcome, TransitionStep};
use super::state::TransitionState;
use crate::auth::{RoleState, SharedTokenStore};
use crate::profile::{ProfileDraft, ProfileKind};
use crate::remote::{RemoteError, RemoteResult, RoleService};

/// Coordinator for one subject's role transitions.
pub struct RoleTransitionCoordinator {
    service: Arc<dyn RoleService>,
    tokens: SharedTokenStore,
    config: TransitionConfig,
    /// Never held across an await point.
    state: Mutex<TransitionState>,
    marker: Option<StuckMarker>,
}

impl RoleTransitionCoordinator {
    /// Create a coordinator for a subject currently holding `current_role`.
    pub fn new(
        service: Arc<dyn RoleService>,
        tokens: SharedTokenStore,
        current_role: RoleState,
        config: TransitionConfig,
    ) -> Self {
        Self {
            service,
            tokens,
            config,
            state: Mutex::new(TransitionState::new(current_role)),
            marker: None,
        }
    }

    /// Create a coordinator whose role belief is read from the installed
    /// credential.
    pub fn from_credential(
        service: Arc<dyn RoleService>,
        tokens: SharedTokenStore,
        config: TransitionConfig,
    ) -> TransitionResult<Self> {
        let credential = tokens.get().ok_or(TransitionError::NotAuthenticated)?;
        let role = credential.role()?;
        Ok(Self::new(service, tokens, role, config))
    }

    /// Persist inconsistent outcomes to `marker`, and start `Stuck` if a
    /// previous process left one behind.
    pub fn with_marker(mut self, marker: StuckMarker) -> TransitionResult<Self> {
        if let Some(record) = marker.read()? {
            tracing::warn!(
                attempt_id = %record.attempt_id,
                original = %record.original,
                elevated = %record.elevated,
                "starting stuck: unresolved role transition on record"
            );
            *self.state.get_mut().unwrap_or_else(|e| e.into_inner()) = TransitionState::Stuck {
                original: record.original,
                elevated: record.elevated,
            };
        }
        self.marker = Some(marker);
        Ok(self)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> TransitionState {
        self.lock_state().clone()
    }

    pub fn state_name(&self) -> &'static str {
        self.lock_state().state_name()
    }

    /// Role the installed credential is believed to encode.
    pub fn current_role(&self) -> RoleState {
        self.lock_state().current_role()
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Claim the subject's transition slot.
    ///
    /// Rejections are synchronous: a concurrent or stuck transition is
    /// refused here and never queued. The returned permit must be `run` to
    /// perform the remote steps; dropping it unused releases the slot.
    pub fn begin(
        &self,
        target: RoleState,
        draft: ProfileDraft,
    ) -> TransitionResult<TransitionPermit<'_>> {
        let mut state = self.lock_state();

        let kind = match self.check(&state, target, &draft) {
            Ok(kind) => kind,
            Err(e) => {
                TransitionEvent::Rejected {
                    to: target,
                    reason: e.to_string(),
                }
                .emit();
                return Err(e);
            }
        };

        let prior = state.clone();
        let stuck_original = match prior {
            TransitionState::Stuck { original, .. } => Some(original),
            _ => None,
        };
        let next = if stuck_original.is_some() {
            prior.clone().retry_from_stuck(target)?
        } else {
            prior.clone().begin(target)?
        };
        let from = next.current_role();
        *state = next;
        drop(state);

        let attempt_id = Uuid::new_v4();
        TransitionEvent::Requested {
            attempt_id,
            from,
            to: target,
            kind,
        }
        .emit();

        Ok(TransitionPermit {
            coordinator: self,
            attempt_id,
            from,
            to: target,
            kind,
            draft,
            stuck_original,
            prior: Some(prior),
            finished: false,
        })
    }

    /// Elevate to `target` and create the profile described by `draft`.
    ///
    /// `Err` only for synchronous rejections; every remote failure is
    /// reported through the outcome.
    pub async fn promote(
        &self,
        target: RoleState,
        draft: ProfileDraft,
    ) -> TransitionResult<TransitionOutcome> {
        let permit = self.begin(target, draft)?;
        Ok(permit.run().await)
    }

    /// Leave `Stuck` after the account was repaired out of band.
    ///
    /// `confirmed_role` is the role the installed credential now encodes.
    pub fn resolve_stuck(&self, confirmed_role: RoleState) -> TransitionResult<()> {
        let mut state = self.lock_state();
        let next = state
            .clone()
            .resolve(confirmed_role)
            .map_err(|_| TransitionError::NotStuck)?;
        if let Some(marker) = &self.marker {
            marker.clear()?;
        }
        *state = next;
        drop(state);

        TransitionEvent::Resolved {
            role: confirmed_role,
        }
        .emit();
        Ok(())
    }

    fn check(
        &self,
        state: &TransitionState,
        target: RoleState,
        draft: &ProfileDraft,
    ) -> TransitionResult<ProfileKind> {
        if state.is_in_flight() {
            return Err(TransitionError::AlreadyInProgress {
                state: state.state_name(),
            });
        }
        if let TransitionState::Stuck { original, elevated } = state {
            if !self.config.retry_when_stuck {
                return Err(TransitionError::Stuck {
                    original: *original,
                    elevated: *elevated,
                });
            }
        }
        if self.tokens.get().is_none() {
            return Err(TransitionError::NotAuthenticated);
        }
        if !state.is_stuck() && state.current_role() == target {
            return Err(TransitionError::AlreadyInRole(target));
        }

        let expected = target
            .profile_kind()
            .ok_or(TransitionError::NoProfileForRole(target))?;
        if draft.kind() != expected {
            return Err(TransitionError::DraftMismatch {
                role: target,
                expected,
                draft: draft.kind(),
            });
        }
        Ok(expected)
    }

    fn lock_state(&self) -> MutexGuard<'_, TransitionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn advance(&self, step: impl FnOnce(TransitionState) -> TransitionResult<TransitionState>) {
        let mut state = self.lock_state();
        match step(state.clone()) {
            Ok(next) => *state = next,
            Err(e) => tracing::error!(error = %e, "transition state out of sync"),
        }
    }

    fn clear_stuck_record(&self) {
        if let Some(marker) = &self.marker {
            if let Err(e) = marker.clear() {
                tracing::error!(
                    path = %marker.path().display(),
                    error = %e,
                    "failed to clear stuck record"
                );
            }
        }
    }

    fn record_stuck(&self, record: StuckRecord) {
        if let Some(marker) = &self.marker {
            if let Err(e) = marker.write(&record) {
                tracing::error!(
                    path = %marker.path().display(),
                    error = %e,
                    "failed to record stuck transition"
                );
            }
        }
    }
}

/// A claimed transition slot, ready to run.
pub struct TransitionPermit<'a> {
    coordinator: &'a RoleTransitionCoordinator,
    attempt_id: Uuid,
    from: RoleState,
    to: RoleState,
    kind: ProfileKind,
    draft: ProfileDraft,
    /// Role held before the account got stuck, when retrying out of `Stuck`.
    /// Only `Success` supersedes the durable record.
    stuck_original: Option<RoleState>,
    /// State to restore if the permit is dropped before running.
    prior: Option<TransitionState>,
    finished: bool,
}

impl TransitionPermit<'_> {
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn from_role(&self) -> RoleState {
        self.from
    }

    pub fn target_role(&self) -> RoleState {
        self.to
    }

    fn original_role(&self) -> RoleState {
        self.stuck_original.unwrap_or(self.from)
    }

    /// Land on the terminal state for a failure that ended back at `from`.
    fn settle_at_from(&self, step: fn(TransitionState) -> TransitionResult<TransitionState>) {
        match self.stuck_original {
            Some(original) => self
                .coordinator
                .advance(move |state| state.restore_stuck(original)),
            None => self.coordinator.advance(step),
        }
    }

    /// Run the remote steps to a terminal outcome.
    ///
    /// Dropping this future before it completes leaves the coordinator
    /// `Stuck`, since the server-side role is then unknown.
    pub async fn run(mut self) -> TransitionOutcome {
        self.prior = None;
        let outcome = self.execute().await;
        self.finished = true;
        outcome
    }

    async fn execute(&self) -> TransitionOutcome {
        let coordinator = self.coordinator;

        // Step 1: elevate. The new credential is installed before step 2 is
        // issued; step 2 authenticates with it.
        let credential = match self
            .bounded(TransitionStep::Elevate, coordinator.service.set_role(self.to))
            .await
        {
            Ok(credential) => credential,
            Err(error) => {
                self.settle_at_from(TransitionState::elevation_rejected);
                TransitionEvent::ElevationFailed {
                    attempt_id: self.attempt_id,
                    error: error.clone(),
                }
                .emit();
                return TransitionOutcome::CleanFailure(FailureReason::new(
                    TransitionStep::Elevate,
                    error,
                ));
            }
        };
        coordinator.tokens.set(credential);
        coordinator.advance(TransitionState::elevated);
        TransitionEvent::Elevated {
            attempt_id: self.attempt_id,
            role: self.to,
        }
        .emit();

        // Step 2: materialize.
        coordinator.advance(TransitionState::begin_materialize);
        let materialize = match self
            .bounded(
                TransitionStep::Materialize,
                coordinator.service.create_profile(self.kind, &self.draft),
            )
            .await
        {
            Ok(profile) => {
                coordinator.advance(TransitionState::materialized);
                if self.stuck_original.is_some() {
                    coordinator.clear_stuck_record();
                }
                TransitionEvent::Materialized {
                    attempt_id: self.attempt_id,
                    profile_id: profile.id.clone(),
                }
                .emit();
                return TransitionOutcome::Success(profile);
            }
            Err(error) => {
                coordinator.advance(TransitionState::materialize_failed);
                TransitionEvent::MaterializeFailed {
                    attempt_id: self.attempt_id,
                    error: error.clone(),
                }
                .emit();
                FailureReason::new(TransitionStep::Materialize, error)
            }
        };

        // Step 3: compensate, exactly once.
        match self
            .bounded(TransitionStep::Compensate, coordinator.service.set_role(self.from))
            .await
        {
            Ok(credential) => {
                coordinator.tokens.set(credential);
                self.settle_at_from(TransitionState::reverted);
                TransitionEvent::Reverted {
                    attempt_id: self.attempt_id,
                    role: self.from,
                }
                .emit();
                TransitionOutcome::CleanFailure(materialize)
            }
            Err(error) => {
                // The elevated credential stays installed: it is the only
                // valid one left.
                let original = self.original_role();
                coordinator.advance(move |state| state.revert_failed(original));
                TransitionEvent::RevertFailed {
                    attempt_id: self.attempt_id,
                    elevated: self.to,
                    error: error.clone(),
                }
                .emit();

                let revert = FailureReason::new(TransitionStep::Compensate, error);
                coordinator.record_stuck(StuckRecord {
                    attempt_id: self.attempt_id,
                    original,
                    elevated: self.to,
                    materialize_error: materialize.to_string(),
                    revert_error: revert.to_string(),
                    recorded_at: Utc::now(),
                });
                TransitionOutcome::InconsistentFailure {
                    materialize,
                    revert,
                }
            }
        }
    }

    async fn bounded<T>(
        &self,
        step: TransitionStep,
        call: impl Future<Output = RemoteResult<T>>,
    ) -> RemoteResult<T> {
        let limit = self.coordinator.config.timeout_for(step);
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout { after: limit }),
        }
    }
}

impl Drop for TransitionPermit<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            // Never ran: nothing changed remotely.
            *self.coordinator.lock_state() = prior;
            return;
        }
        if self.finished {
            return;
        }

        let state = self.coordinator.state_name();
        let original = self.original_role();
        self.coordinator.advance(move |s| s.abandon(original));
        TransitionEvent::Abandoned {
            attempt_id: self.attempt_id,
            state,
        }
        .emit();
        self.coordinator.record_stuck(StuckRecord {
            attempt_id: self.attempt_id,
            original,
            elevated: self.to,
            materialize_error: format!("abandoned while {}", state),
            revert_error: "not attempted".to_string(),
            recorded_at: Utc::now(),
        });
    }
}
