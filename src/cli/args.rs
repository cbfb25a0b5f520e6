//! CLI argument definitions using clap
//!
//! Commands:
//! - myteam login --token <jwt>
//! - myteam logout
//! - myteam whoami
//! - myteam status
//! - myteam promote organizer|player ...
//! - myteam resolve [--role <role>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::RoleState;

/// MY TEAM account client
#[derive(Parser, Debug)]
#[command(name = "myteam")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./myteam.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install a credential obtained from the login page
    Login {
        /// Bearer token
        #[arg(long)]
        token: String,
    },

    /// Forget the installed credential
    Logout,

    /// Show the account the installed credential belongs to
    Whoami,

    /// Show whether a previous registration left the account stuck
    Status,

    /// Register as organizer or player
    Promote {
        #[command(subcommand)]
        profile: PromoteTarget,
    },

    /// Clear a stuck registration after support repaired the account
    Resolve {
        /// Role the account now has (default: role in the installed credential)
        #[arg(long)]
        role: Option<RoleState>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromoteTarget {
    /// Register an organizing committee
    Organizer {
        #[arg(long)]
        committee_name: String,
        #[arg(long)]
        contact_number: String,
        /// Operating area
        #[arg(long)]
        area: String,
        /// Logo image file
        #[arg(long)]
        logo: PathBuf,
        /// Banner image file
        #[arg(long)]
        banner: Option<PathBuf>,
    },

    /// Register as a player
    Player {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        contact_number: String,
        /// Activity area
        #[arg(long)]
        area: String,
        /// Profile photo file
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_promote_organizer() {
        let cli = Cli::try_parse_from([
            "myteam",
            "promote",
            "organizer",
            "--committee-name",
            "Jeju Cup",
            "--contact-number",
            "010-1111-2222",
            "--area",
            "Jeju",
            "--logo",
            "logo.png",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("./myteam.json"));
        match cli.command {
            Command::Promote {
                profile: PromoteTarget::Organizer { committee_name, banner, .. },
            } => {
                assert_eq!(committee_name, "Jeju Cup");
                assert!(banner.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_resolve_role() {
        let cli = Cli::try_parse_from(["myteam", "--config", "x.json", "resolve", "--role", "organizer"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));
        assert!(matches!(
            cli.command,
            Command::Resolve {
                role: Some(RoleState::Organizer)
            }
        ));
    }

    #[test]
    fn test_organizer_requires_logo() {
        assert!(Cli::try_parse_from([
            "myteam",
            "promote",
            "organizer",
            "--committee-name",
            "x",
            "--contact-number",
            "010-1111-2222",
            "--area",
            "y",
        ])
        .is_err());
    }
}
