//! Durable Stuck Marker
//!
//! An inconsistent outcome must survive the process that observed it, so a
//! later run refuses to start a new transition until the account has been
//! repaired. The marker is a single JSON file:
//! - present = stuck (elevated without a profile)
//! - absent = not stuck
//!
//! Writes go to a temp file, are fsynced, then renamed into place.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{TransitionError, TransitionResult};
use crate::auth::RoleState;

const MARKER_FILE_NAME: &str = "role_transition.stuck";

/// What was recorded when a transition got stuck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckRecord {
    pub attempt_id: Uuid,
    pub original: RoleState,
    pub elevated: RoleState,
    pub materialize_error: String,
    pub revert_error: String,
    pub recorded_at: DateTime<Utc>,
}

/// Marker file manager.
#[derive(Debug, Clone)]
pub struct StuckMarker {
    marker_path: PathBuf,
    temp_path: PathBuf,
}

impl StuckMarker {
    /// Marker stored under `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            marker_path: dir.join(MARKER_FILE_NAME),
            temp_path: dir.join(format!("{}.tmp", MARKER_FILE_NAME)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.marker_path
    }

    pub fn write(&self, record: &StuckRecord) -> TransitionResult<()> {
        if let Some(parent) = self.marker_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| marker_error("failed to create marker directory", e))?;
        }

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| marker_error("failed to serialize marker", e))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| marker_error("failed to create temp marker file", e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| marker_error("failed to write marker", e))?;
        file.sync_all()
            .map_err(|e| marker_error("failed to fsync marker", e))?;

        fs::rename(&self.temp_path, &self.marker_path)
            .map_err(|e| marker_error("failed to commit marker", e))?;

        if let Some(parent) = self.marker_path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    pub fn read(&self) -> TransitionResult<Option<StuckRecord>> {
        if !self.marker_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.marker_path)
            .map_err(|e| marker_error("failed to read marker", e))?;
        let record = serde_json::from_str(&content)
            .map_err(|e| marker_error("failed to parse marker", e))?;
        Ok(Some(record))
    }

    pub fn clear(&self) -> TransitionResult<()> {
        if self.marker_path.exists() {
            fs::remove_file(&self.marker_path)
                .map_err(|e| marker_error("failed to remove marker", e))?;
        }
        Ok(())
    }
}

fn marker_error(context: &str, e: impl std::fmt::Display) -> TransitionError {
    TransitionError::Marker(format!("{}: {}", context, e))
}
