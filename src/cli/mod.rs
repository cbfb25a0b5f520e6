//! CLI module for the MY TEAM client
//!
//! Provides command-line interface for:
//! - login / logout / whoami: manage the installed credential
//! - promote: register as organizer or player
//! - status / resolve: inspect and clear a stuck registration

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, PromoteTarget};
pub use commands::{
    login, logout, promote, resolve, resolve_stuck, run_command, status, whoami,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};

/// Parse arguments and run the selected command.
///
/// Failures are also reported as an error envelope on stdout.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli).map_err(|e| {
        let _ = write_error(e.code_str(), e.message());
        e
    })
}
