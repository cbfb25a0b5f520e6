//! Local draft validation.
//!
//! Runs on the caller's side before a promotion is attempted:
//! - Required fields are present and non-blank
//! - Contact numbers look like phone numbers
//! - Attachments are images within the size limit
//! - Organizer drafts carry a logo
//!
//! Validation is side-effect free and reports every failing field.
//! The coordinator never re-validates; the backend has the final word.

use std::fmt;

use super::asset::Asset;
use super::draft::{OrganizerDraft, PlayerDraft, ProfileDraft};

/// Largest attachment accepted, in bytes.
pub const MAX_ASSET_BYTES: usize = 5 * 1024 * 1024;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result for a whole draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Fields that failed, in check order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    /// Ok when valid, otherwise the list of failures.
    pub fn into_result(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }
}

/// Validator for profile drafts.
pub struct DraftValidator {
    max_asset_bytes: usize,
}

impl Default for DraftValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftValidator {
    pub fn new() -> Self {
        Self {
            max_asset_bytes: MAX_ASSET_BYTES,
        }
    }

    /// Override the attachment size limit.
    pub fn with_max_asset_bytes(mut self, max: usize) -> Self {
        self.max_asset_bytes = max;
        self
    }

    pub fn validate(&self, draft: &ProfileDraft) -> ValidationReport {
        let mut report = ValidationReport::default();
        match draft {
            ProfileDraft::Organizer(d) => self.validate_organizer(d, &mut report),
            ProfileDraft::Player(d) => self.validate_player(d, &mut report),
        }
        report
    }

    fn validate_organizer(&self, d: &OrganizerDraft, report: &mut ValidationReport) {
        require_text(report, "committeeName", &d.committee_name);
        check_contact_number(report, "contactNumber", &d.contact_number);
        require_text(report, "operatingArea", &d.operating_area);

        match &d.logo {
            Some(logo) => self.check_asset(report, "logo", logo),
            None => report.push(FieldError::new("logo", "a logo image is required")),
        }
        if let Some(banner) = &d.banner {
            self.check_asset(report, "banner", banner);
        }
    }

    fn validate_player(&self, d: &PlayerDraft, report: &mut ValidationReport) {
        require_text(report, "nickname", &d.nickname);
        require_text(report, "position", &d.position);
        check_contact_number(report, "contactNumber", &d.contact_number);
        require_text(report, "activityArea", &d.activity_area);
        if let Some(photo) = &d.photo {
            self.check_asset(report, "photo", photo);
        }
    }

    fn check_asset(&self, report: &mut ValidationReport, field: &'static str, asset: &Asset) {
        if asset.is_empty() {
            report.push(FieldError::new(field, "file is empty"));
        } else if asset.len() > self.max_asset_bytes {
            report.push(FieldError::new(
                field,
                format!("file exceeds {} bytes", self.max_asset_bytes),
            ));
        }
        if !asset.is_image() {
            report.push(FieldError::new(
                field,
                format!("expected an image, got {}", asset.content_type),
            ));
        }
    }
}

impl ProfileDraft {
    /// Validate with default limits.
    pub fn validate(&self) -> ValidationReport {
        DraftValidator::new().validate(self)
    }
}

fn require_text(report: &mut ValidationReport, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        report.push(FieldError::new(field, "is required"));
    }
}

fn check_contact_number(report: &mut ValidationReport, field: &'static str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        report.push(FieldError::new(field, "is required"));
        return;
    }

    let allowed = value
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == '-' || c == ' ' || (c == '+' && i == 0));
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();

    if !allowed || !(9..=15).contains(&digits) {
        report.push(FieldError::new(field, "must be a phone number of 9 to 15 digits"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logo() -> Asset {
        Asset::new("logo.png", "image/png", vec![0u8; 64])
    }

    fn organizer() -> OrganizerDraft {
        OrganizerDraft {
            committee_name: "Han River FC Committee".to_string(),
            contact_number: "+82 10-1234-5678".to_string(),
            operating_area: "Seoul".to_string(),
            logo: Some(logo()),
            banner: None,
        }
    }

    fn player() -> PlayerDraft {
        PlayerDraft {
            nickname: "striker9".to_string(),
            position: "FW".to_string(),
            contact_number: "01012345678".to_string(),
            activity_area: "Busan".to_string(),
            photo: None,
        }
    }

    #[test]
    fn test_valid_organizer() {
        let report = ProfileDraft::from(organizer()).validate();
        assert!(report.is_valid(), "{:?}", report);
    }

    #[test]
    fn test_valid_player() {
        assert!(ProfileDraft::from(player()).validate().is_valid());
    }

    #[test]
    fn test_missing_logo_and_blank_fields_all_reported() {
        let mut draft = organizer();
        draft.committee_name = "   ".to_string();
        draft.operating_area = String::new();
        draft.logo = None;

        let report = ProfileDraft::from(draft).validate();
        assert_eq!(report.fields(), vec!["committeeName", "operatingArea", "logo"]);
    }

    #[test]
    fn test_contact_number_format() {
        let mut draft = player();
        draft.contact_number = "call me".to_string();
        assert_eq!(ProfileDraft::from(draft.clone()).validate().fields(), vec!["contactNumber"]);

        draft.contact_number = "12345".to_string();
        assert!(!ProfileDraft::from(draft.clone()).validate().is_valid());

        draft.contact_number = "10+12345678".to_string();
        assert!(!ProfileDraft::from(draft).validate().is_valid());
    }

    #[test]
    fn test_asset_checks() {
        let mut draft = organizer();
        draft.banner = Some(Asset::new("banner.pdf", "application/pdf", vec![1; 10]));
        let report = ProfileDraft::from(draft).validate();
        assert_eq!(report.fields(), vec!["banner"]);

        let mut draft = organizer();
        draft.logo = Some(Asset::new("logo.png", "image/png", vec![1; 11]));
        let report = DraftValidator::new()
            .with_max_asset_bytes(10)
            .validate(&ProfileDraft::from(draft));
        assert_eq!(report.fields(), vec!["logo"]);
    }

    #[test]
    fn test_into_result() {
        assert!(ProfileDraft::from(player()).validate().into_result().is_ok());

        let mut draft = player();
        draft.position.clear();
        let errors = ProfileDraft::from(draft).validate().into_result().unwrap_err();
        assert_eq!(errors[0].to_string(), "position: is required");
    }
}
