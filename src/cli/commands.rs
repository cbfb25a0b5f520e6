//! CLI command implementations
//!
//! Each command loads the configuration, installs logging, does its work
//! and prints exactly one JSON envelope on stdout.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::{Credential, FileTokenStore, RoleState, SharedTokenStore, TokenStore};
use crate::config::ClientConfig;
use crate::observability::init_logging;
use crate::profile::{Asset, OrganizerDraft, PlayerDraft, ProfileDraft};
use crate::remote::{HttpRoleService, RoleService};
use crate::transition::{
    RoleTransitionCoordinator, StuckMarker, TransitionOutcome, SUPPORT_MESSAGE,
};

use super::args::{Cli, Command, PromoteTarget};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::write_response;

/// Dispatch a parsed command line.
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = ClientConfig::load(&cli.config)?;
    init_logging(&config.log_filter);

    match cli.command {
        Command::Login { token } => login(&config, token),
        Command::Logout => logout(&config),
        Command::Whoami => whoami(&config),
        Command::Status => status(&config),
        Command::Promote { profile } => promote(&config, profile),
        Command::Resolve { role } => resolve(&config, role),
    }
}

/// Install a credential.
pub fn login(config: &ClientConfig, token: String) -> CliResult<()> {
    let credential = Credential::new(token.trim());
    let claims = credential
        .claims()
        .map_err(|e| CliError::invalid_input(format!("token rejected: {}", e)))?;
    if claims.is_expired() {
        return Err(CliError::invalid_input("token has expired"));
    }

    let store = FileTokenStore::load(config.token_path())?;
    store.set(credential);

    write_response(json!({
        "subject": claims.sub,
        "role": claims.role,
        "token_file": store.path().display().to_string(),
    }))
}

/// Forget the installed credential.
pub fn logout(config: &ClientConfig) -> CliResult<()> {
    let store = FileTokenStore::load(config.token_path())?;
    let had_credential = store.get().is_some();
    store.clear();

    write_response(json!({ "logged_out": had_credential }))
}

/// Describe the installed credential.
pub fn whoami(config: &ClientConfig) -> CliResult<()> {
    let store = FileTokenStore::load(config.token_path())?;
    let credential = store.get().ok_or_else(CliError::not_logged_in)?;
    let claims = credential.claims()?;

    write_response(json!({
        "subject": claims.sub,
        "role": claims.role,
        "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
        "expired": claims.is_expired(),
    }))
}

/// Report whether an earlier registration is stuck.
pub fn status(config: &ClientConfig) -> CliResult<()> {
    let marker = StuckMarker::new(&config.marker_path());
    let record = marker.read()?;

    write_response(json!({
        "stuck": record.is_some(),
        "record": record,
        "message": record.as_ref().map(|_| SUPPORT_MESSAGE),
    }))
}

/// Register as organizer or player.
pub fn promote(config: &ClientConfig, target: PromoteTarget) -> CliResult<()> {
    let draft = build_draft(target)?;
    let report = draft.validate();
    if !report.is_valid() {
        let detail: Vec<String> = report.errors().iter().map(|e| e.to_string()).collect();
        return Err(CliError::invalid_input(detail.join("; ")));
    }
    let role = match &draft {
        ProfileDraft::Organizer(_) => RoleState::Organizer,
        ProfileDraft::Player(_) => RoleState::Player,
    };

    let coordinator = open_coordinator(config)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("failed to start runtime: {}", e)))?;
    let outcome = rt.block_on(coordinator.promote(role, draft))?;

    report_outcome(&outcome)
}

/// Leave the stuck state once support has repaired the account.
pub fn resolve(config: &ClientConfig, role: Option<RoleState>) -> CliResult<()> {
    let confirmed = resolve_stuck(config, role)?;

    write_response(json!({
        "resolved": true,
        "role": confirmed,
    }))
}

/// Clear the stuck record and return the role now believed to be held.
///
/// Without an explicit role, the installed credential's role is used; the
/// coordinator itself only knows the recorded elevated role while stuck.
pub fn resolve_stuck(config: &ClientConfig, role: Option<RoleState>) -> CliResult<RoleState> {
    let coordinator = open_coordinator(config)?;
    let confirmed = match role {
        Some(role) => role,
        None => installed_role(config)?,
    };
    coordinator.resolve_stuck(confirmed)?;
    Ok(confirmed)
}

fn installed_role(config: &ClientConfig) -> CliResult<RoleState> {
    let store = FileTokenStore::load(config.token_path())?;
    let credential = store.get().ok_or_else(CliError::not_logged_in)?;
    Ok(credential.role()?)
}

fn open_coordinator(config: &ClientConfig) -> CliResult<RoleTransitionCoordinator> {
    let tokens: SharedTokenStore = Arc::new(FileTokenStore::load(config.token_path())?);
    if tokens.get().is_none() {
        return Err(CliError::not_logged_in());
    }

    let service: Arc<dyn RoleService> = Arc::new(
        HttpRoleService::new(&config.api_base_url, tokens.clone())
            .with_paths(config.endpoints.clone()),
    );
    let coordinator =
        RoleTransitionCoordinator::from_credential(service, tokens, config.transition_config())?
            .with_marker(StuckMarker::new(&config.marker_path()))?;
    Ok(coordinator)
}

fn build_draft(target: PromoteTarget) -> CliResult<ProfileDraft> {
    let draft = match target {
        PromoteTarget::Organizer {
            committee_name,
            contact_number,
            area,
            logo,
            banner,
        } => OrganizerDraft {
            committee_name,
            contact_number,
            operating_area: area,
            logo: Some(read_asset(&logo)?),
            banner: banner.as_deref().map(read_asset).transpose()?,
        }
        .into(),
        PromoteTarget::Player {
            nickname,
            position,
            contact_number,
            area,
            photo,
        } => PlayerDraft {
            nickname,
            position,
            contact_number,
            activity_area: area,
            photo: photo.as_deref().map(read_asset).transpose()?,
        }
        .into(),
    };
    Ok(draft)
}

fn read_asset(path: &Path) -> CliResult<Asset> {
    Asset::from_path(path)
        .map_err(|e| CliError::invalid_input(format!("cannot read {}: {}", path.display(), e)))
}

fn report_outcome(outcome: &TransitionOutcome) -> CliResult<()> {
    let code = match outcome {
        TransitionOutcome::Success(profile) => {
            return write_response(json!({
                "outcome": "success",
                "profile": profile,
                "message": outcome.user_message(),
            }));
        }
        TransitionOutcome::CleanFailure(_) => CliErrorCode::TransitionFailed,
        TransitionOutcome::InconsistentFailure { .. } => CliErrorCode::AccountInconsistent,
    };
    if let Some(reason) = outcome.primary_reason() {
        tracing::debug!(step = reason.step.as_str(), reason = %reason, "registration failed");
    }
    Err(CliError::new(code, outcome.user_message()))
}
