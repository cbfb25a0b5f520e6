//! Profile drafts submitted when a subject takes on a profile-bearing role.
//!
//! A draft is built by the caller, validated locally, then handed by value
//! to the coordinator, which consumes it exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// Kind of dependent profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileKind {
    Organizer,
    Player,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "ORGANIZER",
            Self::Player => "PLAYER",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organizer (committee) registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerDraft {
    pub committee_name: String,
    pub contact_number: String,
    pub operating_area: String,
    pub logo: Option<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Asset>,
}

/// Player registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub nickname: String,
    pub position: String,
    pub contact_number: String,
    pub activity_area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Asset>,
}

/// A submitted profile form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProfileDraft {
    Organizer(OrganizerDraft),
    Player(PlayerDraft),
}

impl ProfileDraft {
    /// The profile record this draft creates.
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Organizer(_) => ProfileKind::Organizer,
            Self::Player(_) => ProfileKind::Player,
        }
    }
}

impl From<OrganizerDraft> for ProfileDraft {
    fn from(draft: OrganizerDraft) -> Self {
        Self::Organizer(draft)
    }
}

impl From<PlayerDraft> for ProfileDraft {
    fn from(draft: PlayerDraft) -> Self {
        Self::Player(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organizer() -> OrganizerDraft {
        OrganizerDraft {
            committee_name: "Seoul Sunday League".to_string(),
            contact_number: "010-1234-5678".to_string(),
            operating_area: "Mapo-gu".to_string(),
            logo: Some(Asset::new("logo.png", "image/png", vec![1])),
            banner: None,
        }
    }

    #[test]
    fn test_kind_follows_variant() {
        let draft: ProfileDraft = organizer().into();
        assert_eq!(draft.kind(), ProfileKind::Organizer);
    }

    #[test]
    fn test_body_is_flat_camel_case() {
        let draft: ProfileDraft = organizer().into();
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["committeeName"], "Seoul Sunday League");
        assert_eq!(json["operatingArea"], "Mapo-gu");
        assert!(json.get("banner").is_none());
        assert_eq!(json["logo"]["fileName"], "logo.png");
    }
}
