//! # Remote Module
//!
//! The backend role service as seen by the client. The coordinator treats it
//! as an untrusted, fallible remote: every call may fail, and every failure
//! is reported as a `RemoteError`.

mod errors;
mod http;

pub use errors::{RemoteError, RemoteResult};
pub use http::{EndpointPaths, HttpRoleService};

use async_trait::async_trait;

use crate::auth::{Credential, RoleState};
use crate::profile::{Profile, ProfileDraft, ProfileKind};

/// Backend operations the role transition depends on.
///
/// Both calls authenticate with whatever credential is active at the time
/// they are issued.
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Ask the backend to change the caller's role.
    ///
    /// On success the backend returns a fresh credential for the new role.
    async fn set_role(&self, role: RoleState) -> RemoteResult<Credential>;

    /// Create the dependent profile record for the caller.
    async fn create_profile(&self, kind: ProfileKind, draft: &ProfileDraft) -> RemoteResult<Profile>;
}
