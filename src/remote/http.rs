//! HTTP+JSON client for the backend role service.
//!
//! - `PATCH {base}/users/me/role` with `{"role": "ORGANIZER"}` returns
//!   `{"credential": "..."}`
//! - `POST {base}/organizers` or `{base}/players` with the draft returns
//!   `{"profileId": ..., ...echoed fields}`
//!
//! The bearer token is read from the shared token store on every request.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use super::errors::{RemoteError, RemoteResult};
use super::RoleService;
use crate::auth::{Credential, RoleState, SharedTokenStore};
use crate::profile::{Profile, ProfileDraft, ProfileKind};

/// Endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub role: String,
    pub organizer_profile: String,
    pub player_profile: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            role: "/users/me/role".to_string(),
            organizer_profile: "/organizers".to_string(),
            player_profile: "/players".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    SetRole,
    CreateProfile,
}

#[derive(Serialize)]
struct SetRoleRequest {
    role: RoleState,
}

#[derive(Deserialize)]
struct SetRoleResponse {
    #[serde(alias = "token", alias = "accessToken")]
    credential: String,
}

/// Role service reached over HTTP.
#[derive(Clone)]
pub struct HttpRoleService {
    client: Client,
    base_url: String,
    paths: EndpointPaths,
    tokens: SharedTokenStore,
}

impl HttpRoleService {
    pub fn new(base_url: impl Into<String>, tokens: SharedTokenStore) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            paths: EndpointPaths::default(),
            tokens,
        }
    }

    pub fn with_paths(mut self, paths: EndpointPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RemoteResult<RequestBuilder> {
        let credential = self
            .tokens
            .get()
            .ok_or_else(|| RemoteError::Unauthorized("no credential installed".to_string()))?;
        Ok(request.header(reqwest::header::AUTHORIZATION, credential.bearer()))
    }

    async fn send(&self, op: Operation, request: RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify(op, status, &body))
    }
}

#[async_trait]
impl RoleService for HttpRoleService {
    #[tracing::instrument(skip(self))]
    async fn set_role(&self, role: RoleState) -> RemoteResult<Credential> {
        let request = self
            .authorized(self.client.patch(self.url(&self.paths.role)))?
            .json(&SetRoleRequest { role });

        let response = self.send(Operation::SetRole, request).await?;
        let body: SetRoleResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        if body.credential.trim().is_empty() {
            return Err(RemoteError::Decode("empty credential".to_string()));
        }
        tracing::debug!("role change confirmed");
        Ok(Credential::new(body.credential))
    }

    #[tracing::instrument(skip(self, draft))]
    async fn create_profile(&self, kind: ProfileKind, draft: &ProfileDraft) -> RemoteResult<Profile> {
        let path = match kind {
            ProfileKind::Organizer => &self.paths.organizer_profile,
            ProfileKind::Player => &self.paths.player_profile,
        };
        let request = self.authorized(self.client.post(self.url(path)))?.json(draft);

        let response = self.send(Operation::CreateProfile, request).await?;
        let mut profile: Profile = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        profile.kind.get_or_insert(kind);

        tracing::debug!(profile_id = %profile.id, "profile created");
        Ok(profile)
    }
}

/// Map a non-success status to the service error taxonomy.
fn classify(op: Operation, status: StatusCode, body: &str) -> RemoteError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    match (status.as_u16(), op) {
        (401 | 403, _) => RemoteError::Unauthorized(message),
        (400 | 422, Operation::SetRole) => RemoteError::InvalidRole(message),
        (400 | 422, Operation::CreateProfile) => RemoteError::Validation(message),
        (409, _) => RemoteError::Conflict(message),
        (code, _) => RemoteError::Status {
            status: code,
            message,
        },
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use std::sync::Arc;

    #[test]
    fn test_classify_by_operation() {
        let body = r#"{"message": "committeeName must not be blank"}"#;
        assert_eq!(
            classify(Operation::CreateProfile, StatusCode::BAD_REQUEST, body),
            RemoteError::Validation("committeeName must not be blank".into())
        );
        assert_eq!(
            classify(Operation::SetRole, StatusCode::BAD_REQUEST, r#"{"error": "no"}"#),
            RemoteError::InvalidRole("no".into())
        );
        assert_eq!(
            classify(Operation::SetRole, StatusCode::UNAUTHORIZED, ""),
            RemoteError::Unauthorized("Unauthorized".into())
        );
        assert_eq!(
            classify(Operation::CreateProfile, StatusCode::CONFLICT, "exists"),
            RemoteError::Conflict("exists".into())
        );
        assert_eq!(
            classify(Operation::CreateProfile, StatusCode::BAD_GATEWAY, ""),
            RemoteError::Status {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("  "), None);
        assert_eq!(error_message("plain text"), Some("plain text".into()));
        assert_eq!(error_message(r#"{"code": 7}"#), Some(r#"{"code": 7}"#.into()));
    }

    #[test]
    fn test_url_joining() {
        let service = HttpRoleService::new("http://api.test/v1/", Arc::new(MemoryTokenStore::new()));
        assert_eq!(service.base_url(), "http://api.test/v1");
        assert_eq!(service.url("/organizers"), "http://api.test/v1/organizers");
        assert_eq!(service.url("players"), "http://api.test/v1/players");
    }

    #[tokio::test]
    async fn test_missing_credential_is_unauthorized() {
        let service = HttpRoleService::new("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new()));
        let err = service.set_role(RoleState::Organizer).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unauthorized(_)));
    }
}
