//! # Profile Module
//!
//! Dependent profile records created alongside a role change:
//! drafts (the submitted form), attachments, local validation, and the
//! record the backend returns.

mod asset;
mod draft;
mod record;
mod validator;

pub use asset::Asset;
pub use draft::{OrganizerDraft, PlayerDraft, ProfileDraft, ProfileKind};
pub use record::Profile;
pub use validator::{DraftValidator, FieldError, ValidationReport, MAX_ASSET_BYTES};
