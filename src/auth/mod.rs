//! # Auth Module
//!
//! Client-side view of authentication:
//! - `RoleState`: cached belief about the subject's role
//! - `Credential`: opaque bearer token, optionally peeked for claims
//! - `TokenStore`: the single active credential for this process

mod credential;
mod errors;
mod role;
mod store;

pub use credential::{Credential, CredentialClaims};
pub use errors::{AuthError, AuthResult};
pub use role::RoleState;
pub use store::{FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenStore};
