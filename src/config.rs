//! Client configuration
//!
//! Loaded from a JSON file (default `./myteam.json`), then overridden by
//! environment variables (a `.env` file is honoured):
//! - `MYTEAM_API_URL` replaces `api_base_url`
//! - `MYTEAM_LOG` replaces `log_filter`
//!
//! If the file is absent, `MYTEAM_API_URL` alone is enough to run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::EndpointPaths;
use crate::transition::TransitionConfig;

pub const API_URL_ENV: &str = "MYTEAM_API_URL";
pub const LOG_FILTER_ENV: &str = "MYTEAM_LOG";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config JSON: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-step deadlines in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub elevate_ms: u64,
    pub materialize_ms: u64,
    pub compensate_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            elevate_ms: 10_000,
            materialize_ms: 30_000,
            compensate_ms: 10_000,
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.myteam.example/api` (required)
    #[serde(default)]
    pub api_base_url: String,

    /// Where the active credential is kept between runs
    #[serde(default = "default_token_file")]
    pub token_file: String,

    /// Directory for the stuck-transition marker (default: next to the token)
    #[serde(default)]
    pub marker_dir: Option<String>,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Allow a new transition while stuck (default: false)
    #[serde(default)]
    pub retry_when_stuck: bool,

    #[serde(default)]
    pub endpoints: EndpointPaths,

    /// `tracing` filter directive (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_token_file() -> String {
    ".myteam/token.json".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            token_file: default_token_file(),
            marker_dir: None,
            timeouts: TimeoutConfig::default(),
            retry_when_stuck: false,
            endpoints: EndpointPaths::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`, apply environment overrides, validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Self::from_json(&content)?
        } else if std::env::var_os(API_URL_ENV).is_some() {
            Self::default()
        } else {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                reason: format!("file not found and {} is not set", API_URL_ENV),
            });
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api_base_url is required".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                url
            )));
        }

        let t = &self.timeouts;
        if t.elevate_ms == 0 || t.materialize_ms == 0 || t.compensate_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".into()));
        }

        if self.token_file.trim().is_empty() {
            return Err(ConfigError::Invalid("token_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn token_path(&self) -> PathBuf {
        PathBuf::from(&self.token_file)
    }

    /// Directory holding the stuck marker.
    pub fn marker_path(&self) -> PathBuf {
        match &self.marker_dir {
            Some(dir) => PathBuf::from(dir),
            None => self
                .token_path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn transition_config(&self) -> TransitionConfig {
        TransitionConfig {
            elevate_timeout: Duration::from_millis(self.timeouts.elevate_ms),
            materialize_timeout: Duration::from_millis(self.timeouts.materialize_ms),
            compensate_timeout: Duration::from_millis(self.timeouts.compensate_ms),
            retry_when_stuck: self.retry_when_stuck,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = ClientConfig::from_json(r#"{"api_base_url": "https://api.test"}"#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.token_file, ".myteam/token.json");
        assert_eq!(config.marker_path(), PathBuf::from(".myteam"));
        assert_eq!(config.endpoints, EndpointPaths::default());
        assert_eq!(config.log_filter, "info");

        let transition = config.transition_config();
        assert_eq!(transition.materialize_timeout, Duration::from_secs(30));
        assert!(!transition.retry_when_stuck);
    }

    #[test]
    fn test_partial_timeouts_and_endpoints() {
        let config = ClientConfig::from_json(
            r#"{
                "api_base_url": "http://localhost:8080/api",
                "timeouts": {"elevate_ms": 500},
                "endpoints": {"role": "/members/me/role"},
                "marker_dir": "/var/lib/myteam"
            }"#,
        )
        .unwrap();

        assert_eq!(config.timeouts.elevate_ms, 500);
        assert_eq!(config.timeouts.compensate_ms, 10_000);
        assert_eq!(config.endpoints.role, "/members/me/role");
        assert_eq!(config.endpoints.organizer_profile, "/organizers");
        assert_eq!(config.marker_path(), PathBuf::from("/var/lib/myteam"));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_err());

        config.api_base_url = "ftp://api.test".into();
        assert!(config.validate().is_err());

        config.api_base_url = "https://api.test".into();
        config.timeouts.compensate_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::from_json(r#"{"api_base_url": "https://file.test"}"#).unwrap();
        config.apply_overrides(|key| match key {
            API_URL_ENV => Some("https://env.test".into()),
            LOG_FILTER_ENV => Some("  ".into()),
            _ => None,
        });

        assert_eq!(config.api_base_url, "https://env.test");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("myteam.json");
        fs::write(&path, r#"{"api_base_url": "https://api.test", "retry_when_stuck": true}"#)
            .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert!(config.retry_when_stuck);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("myteam.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
