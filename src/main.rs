//! myteam CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Exit codes:
//! - 0: success
//! - 1: usage, configuration or I/O error
//! - 2: registration failed cleanly, safe to retry
//! - 3: registration left the account inconsistent

use myteam_roles::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}
