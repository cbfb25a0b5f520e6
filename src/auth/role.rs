//! # Roles
//!
//! The client's cached belief about a subject's role. The authoritative copy
//! lives server-side and is only observed through confirmed credentials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use crate::profile::ProfileKind;

/// Role of an account on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleState {
    /// Plain registered account
    User,
    /// Account with a player profile
    Player,
    /// Account with an organizer (committee) profile
    Organizer,
    /// Moderator
    Admin,
}

impl RoleState {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Player => "PLAYER",
            Self::Organizer => "ORGANIZER",
            Self::Admin => "ADMIN",
        }
    }

    /// The dependent profile a promotion to this role must create.
    ///
    /// `None` for roles that have no profile record.
    pub fn profile_kind(&self) -> Option<ProfileKind> {
        match self {
            Self::Organizer => Some(ProfileKind::Organizer),
            Self::Player => Some(ProfileKind::Player),
            Self::User | Self::Admin => None,
        }
    }
}

impl fmt::Display for RoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleState {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Authorities may arrive prefixed.
        let name = s.trim();
        let name = name.strip_prefix("ROLE_").unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "PLAYER" => Ok(Self::Player),
            "ORGANIZER" => Ok(Self::Organizer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(AuthError::UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("ORGANIZER".parse::<RoleState>().unwrap(), RoleState::Organizer);
        assert_eq!("player".parse::<RoleState>().unwrap(), RoleState::Player);
        assert_eq!("ROLE_ADMIN".parse::<RoleState>().unwrap(), RoleState::Admin);
        assert!("COACH".parse::<RoleState>().is_err());
    }

    #[test]
    fn test_serde_wire_form() {
        let json = serde_json::to_string(&RoleState::Organizer).unwrap();
        assert_eq!(json, "\"ORGANIZER\"");
        let role: RoleState = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, RoleState::User);
    }

    #[test]
    fn test_profile_kind() {
        assert_eq!(RoleState::Organizer.profile_kind(), Some(ProfileKind::Organizer));
        assert_eq!(RoleState::Player.profile_kind(), Some(ProfileKind::Player));
        assert_eq!(RoleState::User.profile_kind(), None);
        assert_eq!(RoleState::Admin.profile_kind(), None);
    }
}
