//! CLI-specific error types
//!
//! Every error carries a string code for the JSON output and a process exit
//! code. Registration outcomes get their own exit codes so scripts can tell
//! "retry" from "contact support".

use std::fmt;
use std::io;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::transition::TransitionError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, files)
    IoError,
    /// No usable credential
    NotLoggedIn,
    /// Bad user input (draft fields, token)
    InvalidInput,
    /// Registration refused before contacting the backend
    Rejected,
    /// Registration failed cleanly; safe to retry
    TransitionFailed,
    /// Registration left the account elevated without a profile
    AccountInconsistent,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "MYTEAM_CLI_CONFIG_ERROR",
            Self::IoError => "MYTEAM_CLI_IO_ERROR",
            Self::NotLoggedIn => "MYTEAM_CLI_NOT_LOGGED_IN",
            Self::InvalidInput => "MYTEAM_CLI_INVALID_INPUT",
            Self::Rejected => "MYTEAM_CLI_REJECTED",
            Self::TransitionFailed => "MYTEAM_CLI_TRANSITION_FAILED",
            Self::AccountInconsistent => "MYTEAM_CLI_ACCOUNT_INCONSISTENT",
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TransitionFailed => 2,
            Self::AccountInconsistent => 3,
            _ => 1,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn not_logged_in() -> Self {
        Self::new(
            CliErrorCode::NotLoggedIn,
            "No credential installed. Run 'myteam login --token <token>' first.",
        )
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        if e.requires_login() {
            Self::new(CliErrorCode::NotLoggedIn, e.to_string())
        } else {
            Self::io_error(e.to_string())
        }
    }
}

impl From<TransitionError> for CliError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::NotAuthenticated => Self::not_logged_in(),
            TransitionError::Credential(auth) => auth.into(),
            TransitionError::Stuck { .. } => {
                Self::new(CliErrorCode::AccountInconsistent, e.to_string())
            }
            TransitionError::Marker(_) => Self::io_error(e.to_string()),
            other => Self::new(CliErrorCode::Rejected, other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
