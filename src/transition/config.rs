//! Coordinator configuration.

use std::time::Duration;

use super::outcome::TransitionStep;

/// Per-step deadlines and the stuck-retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionConfig {
    /// Deadline for the role change
    pub elevate_timeout: Duration,

    /// Deadline for profile creation (uploads assets)
    pub materialize_timeout: Duration,

    /// Deadline for the compensating role change
    pub compensate_timeout: Duration,

    /// Allow resuming a stuck transition at profile creation
    pub retry_when_stuck: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            elevate_timeout: Duration::from_secs(10),
            materialize_timeout: Duration::from_secs(30),
            compensate_timeout: Duration::from_secs(10),
            retry_when_stuck: false,
        }
    }
}

impl TransitionConfig {
    /// Same deadline for every step.
    pub fn with_uniform_timeout(timeout: Duration) -> Self {
        Self {
            elevate_timeout: timeout,
            materialize_timeout: timeout,
            compensate_timeout: timeout,
            ..Self::default()
        }
    }

    pub fn with_retry_when_stuck(mut self, allow: bool) -> Self {
        self.retry_when_stuck = allow;
        self
    }

    pub fn timeout_for(&self, step: TransitionStep) -> Duration {
        match step {
            TransitionStep::Elevate => self.elevate_timeout,
            TransitionStep::Materialize => self.materialize_timeout,
            TransitionStep::Compensate => self.compensate_timeout,
        }
    }
}
