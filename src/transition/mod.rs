//! Role Transition Subsystem
//!
//! Moves an account to a profile-bearing role (organizer, player) in two
//! remote steps, undoing the first if the second fails:
//! - Elevate: confirmed role change, credential swapped immediately
//! - Materialize: dependent profile created with the new credential
//! - Compensate: single best-effort revert after a materialize failure
//!
//! Guarantees:
//! - One transition per subject at a time; extra requests are refused, not queued
//! - No local role change without remote confirmation
//! - Every remote failure becomes an outcome; nothing is retried automatically
//! - Outcomes are either clean (safe to retry) or inconsistent (needs support)

mod config;
mod coordinator;
mod errors;
mod marker;
mod observability;
mod outcome;
mod state;

pub use config::TransitionConfig;
pub use coordinator::{RoleTransitionCoordinator, TransitionPermit};
pub use errors::{TransitionError, TransitionResult};
pub use marker::{StuckMarker, StuckRecord};
pub use observability::TransitionEvent;
pub use outcome::{FailureReason, TransitionOutcome, TransitionStep, SUPPORT_MESSAGE};
pub use state::TransitionState;
