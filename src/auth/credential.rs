//! # Credential
//!
//! Opaque bearer token issued by the backend. The token encodes the subject
//! and its role server-side; the client may peek at the claims to seed its
//! cached role, but never treats them as authoritative.
//!
//! ## Invariants
//! - At most one credential is active client-side (see `TokenStore`)
//! - The raw token is never written to logs

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::role::RoleState;

/// Bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Peek at the claims without verifying the signature or expiry.
    ///
    /// Only the backend can verify a credential; this is used to display
    /// the account and to seed the cached role at startup.
    pub fn claims(&self) -> AuthResult<CredentialClaims> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        // The role stays a plain string until the token is known to be
        // well-formed, so only the role claim itself yields `UnknownRole`.
        let raw = decode::<RawClaims>(&self.0, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| AuthError::MalformedToken)?
            .claims;

        Ok(CredentialClaims {
            sub: raw.sub,
            role: raw.role.parse()?,
            exp: raw.exp,
        })
    }

    /// Role encoded in the credential.
    pub fn role(&self) -> AuthResult<RoleState> {
        Ok(self.claims()?.role)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(6)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "Credential(..{})", tail)
    }
}

#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(alias = "auth")]
    role: String,
    #[serde(default)]
    exp: Option<i64>,
}

/// Claims the backend places in its access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject identifier
    pub sub: String,

    /// Role the token was issued for
    #[serde(alias = "auth")]
    pub role: RoleState,

    /// Expiration (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl CredentialClaims {
    /// Expiration as a timestamp, if the token carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Whether the token has expired according to the local clock.
    pub fn is_expired(&self) -> bool {
        self.expires_at().map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(role: RoleState, exp: Option<i64>) -> Credential {
        let claims = CredentialClaims {
            sub: "42".to_string(),
            role,
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server_side_secret"),
        )
        .unwrap();
        Credential::new(token)
    }

    #[test]
    fn test_claims_peek_without_secret() {
        let credential = mint(RoleState::Organizer, None);
        let claims = credential.claims().unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, RoleState::Organizer);
        assert_eq!(credential.role().unwrap(), RoleState::Organizer);
    }

    #[test]
    fn test_expired_token_still_readable() {
        let credential = mint(RoleState::User, Some(1_000));
        let claims = credential.claims().unwrap();
        assert!(claims.is_expired());
        assert_eq!(claims.role, RoleState::User);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let credential = Credential::new("not-a-jwt");
        assert!(matches!(credential.claims(), Err(AuthError::MalformedToken)));
    }

    fn encode_raw(claims: serde_json::Value) -> Credential {
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server_side_secret"),
        )
        .unwrap();
        Credential::new(token)
    }

    #[test]
    fn test_unknown_role_claim() {
        let credential = encode_raw(serde_json::json!({ "sub": "42", "role": "COACH" }));
        match credential.claims() {
            Err(AuthError::UnknownRole(role)) => assert_eq!(role, "COACH"),
            other => panic!("expected UnknownRole, got {:?}", other),
        }

        let credential = encode_raw(serde_json::json!({ "sub": "42", "auth": "ROLE_PLAYER" }));
        assert_eq!(credential.role().unwrap(), RoleState::Player);
    }

    #[test]
    fn test_broken_claims_are_malformed() {
        // Missing subject
        let credential = encode_raw(serde_json::json!({ "role": "USER" }));
        assert!(matches!(credential.claims(), Err(AuthError::MalformedToken)));

        // Missing role
        let credential = encode_raw(serde_json::json!({ "sub": "42" }));
        assert!(matches!(credential.claims(), Err(AuthError::MalformedToken)));

        // Wrong type for expiry
        let credential =
            encode_raw(serde_json::json!({ "sub": "42", "role": "USER", "exp": "tomorrow" }));
        assert!(matches!(credential.claims(), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("header.payload.signature123456");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("payload"));
        assert!(debug.ends_with("123456)"));
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(Credential::new("abc").bearer(), "Bearer abc");
    }
}
