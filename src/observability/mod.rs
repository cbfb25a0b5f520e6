//! Observability for the MY TEAM client
//!
//! Structured logging through `tracing`. Subsystems emit named events
//! (see `transition::TransitionEvent`); this module only installs the
//! subscriber that renders them.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No effect on decisions
//! 3. Secrets (credentials, asset bytes) never reach a log line

mod logger;

pub use logger::{build_filter, init_logging, DEFAULT_FILTER};
