//! # Token Store
//!
//! Holds the single active credential for this process.
//!
//! ## Invariants
//! - One active value; every successful role change overwrites it
//! - Readers re-read lazily; nothing caches a credential across a promotion
//! - The in-memory slot is authoritative; file persistence is best-effort

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::Credential;
use super::errors::{AuthError, AuthResult};

/// Process-wide holder of the active credential.
pub trait TokenStore: Send + Sync {
    /// The active credential, if logged in.
    fn get(&self) -> Option<Credential>;

    /// Install a new active credential.
    fn set(&self, credential: Credential) {
        self.replace(credential);
    }

    /// Install a new active credential and return the one it displaced.
    fn replace(&self, credential: Credential) -> Option<Credential>;

    /// Drop the active credential (logout).
    fn clear(&self);
}

/// Shared handle used by the coordinator and the remote client.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// In-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    /// Empty store (logged out).
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a credential already installed (logged in).
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace(&self, credential: Credential) -> Option<Credential> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.replace(credential)
    }

    fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

/// On-disk form of the stored credential.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    credential: Credential,
    saved_at: DateTime<Utc>,
}

/// Token store persisted to a JSON file.
///
/// Writes go to a temp file, are fsynced, then renamed over the target so a
/// crash never leaves a half-written token behind.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    temp_path: PathBuf,
    memory: MemoryTokenStore,
}

impl FileTokenStore {
    /// Open the store at `path`, loading any credential already saved there.
    pub fn load(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref().to_path_buf();
        let temp_path = path.with_extension("tmp");

        let memory = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AuthError::StorageError(format!("failed to read {}: {}", path.display(), e))
            })?;
            let stored: StoredToken = serde_json::from_str(&content).map_err(|e| {
                AuthError::StorageError(format!("failed to parse {}: {}", path.display(), e))
            })?;
            MemoryTokenStore::with_credential(stored.credential)
        } else {
            MemoryTokenStore::new()
        };

        Ok(Self {
            path,
            temp_path,
            memory,
        })
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, credential: &Credential) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AuthError::StorageError(format!("failed to create token directory: {}", e))
                })?;
            }
        }

        let stored = StoredToken {
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| AuthError::StorageError(format!("failed to serialize token: {}", e)))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| AuthError::StorageError(format!("failed to create temp token file: {}", e)))?;
        file.write_all(content.as_bytes())
            .map_err(|e| AuthError::StorageError(format!("failed to write token: {}", e)))?;
        file.sync_all()
            .map_err(|e| AuthError::StorageError(format!("failed to fsync token: {}", e)))?;

        fs::rename(&self.temp_path, &self.path)
            .map_err(|e| AuthError::StorageError(format!("failed to commit token file: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Credential> {
        self.memory.get()
    }

    fn replace(&self, credential: Credential) -> Option<Credential> {
        if let Err(e) = self.persist(&credential) {
            tracing::warn!(path = %self.path.display(), error = %e, "credential not persisted");
        }
        self.memory.replace(credential)
    }

    fn clear(&self) {
        self.memory.clear();
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "token file not removed");
            }
        }
    }
}
