//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

use myteam_roles::auth::{Credential, CredentialClaims, RoleState};
use myteam_roles::profile::{Asset, OrganizerDraft, PlayerDraft, ProfileDraft};

pub const SUBJECT: &str = "user-7f3a";

/// Mint a signed access token the way the backend would.
pub fn mint(role: RoleState) -> Credential {
    let claims = CredentialClaims {
        sub: SUBJECT.to_string(),
        role,
        exp: Some(Utc::now().timestamp() + 3600),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-secret"),
    )
    .unwrap();
    Credential::new(token)
}

pub fn organizer_draft() -> ProfileDraft {
    OrganizerDraft {
        committee_name: "Suwon Sunday League".to_string(),
        contact_number: "010-1234-5678".to_string(),
        operating_area: "Suwon".to_string(),
        logo: Some(Asset::new("logo.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])),
        banner: None,
    }
    .into()
}

pub fn player_draft() -> ProfileDraft {
    PlayerDraft {
        nickname: "striker9".to_string(),
        position: "FW".to_string(),
        contact_number: "+82-10-9876-5432".to_string(),
        activity_area: "Busan".to_string(),
        photo: None,
    }
    .into()
}
