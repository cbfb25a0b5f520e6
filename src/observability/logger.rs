//! Structured logger setup.
//!
//! - One line per event, fields as key=value
//! - Written to stderr; stdout is reserved for command output
//! - Filter from a `tracing` directive (`info`, `myteam_roles=debug`, ...)

use std::io;

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when the configured directive does not parse.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter, falling back to `DEFAULT_FILTER` on a bad directive.
pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("[logging] invalid filter '{}': {}; using '{}'", directive, e, DEFAULT_FILTER);
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is kept.
pub fn init_logging(directive: &str) -> bool {
    fmt()
        .with_env_filter(build_filter(directive))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_parse() {
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(build_filter("myteam_roles=trace").to_string(), "myteam_roles=trace");
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let _ = init_logging("warn");
        assert!(!init_logging("warn"));
    }
}
