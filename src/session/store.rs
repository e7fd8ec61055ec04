//! Persistence collaborators.
//!
//! The engine is storage-agnostic. A session only touches a store at
//! its boundaries: when opened, when reset, and when asked to save.
//!
//! - `MemoryStore`: bincode bytes held in memory
//! - `JsonFileStore`: pretty-printed JSON in a single file
//!
//! Both validate on load; corrupt or inconsistent data surfaces as
//! `StoreError::Invalid` or `StoreError::Decode`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::core::error::RestoreError;
use crate::core::state::{PersistedState, ProgressionState};

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode state: {0}")]
    Encode(String),

    #[error("failed to decode state: {0}")]
    Decode(String),

    #[error("stored state is invalid: {0}")]
    Invalid(#[from] RestoreError),
}

/// Load/save boundary for one player's state.
pub trait StateStore: Send + Sync {
    /// Load the saved state, or `None` if nothing is saved.
    fn load(&self) -> Result<Option<ProgressionState>, StoreError>;

    /// Replace the saved state.
    fn save(&self, state: &ProgressionState) -> Result<(), StoreError>;

    /// Delete the saved state. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store holding bincode-encoded snapshots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with raw bytes.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
        }
    }

    /// Check if a snapshot is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot().is_none()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressionState>, StoreError> {
        let slot = self.slot();
        let Some(bytes) = slot.as_ref() else {
            return Ok(None);
        };
        let persisted: PersistedState =
            bincode::deserialize(bytes).map_err(|err| StoreError::Decode(err.to_string()))?;
        Ok(Some(ProgressionState::restore(persisted)?))
    }

    fn save(&self, state: &ProgressionState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(&state.to_persisted())
            .map_err(|err| StoreError::Encode(err.to_string()))?;
        *self.slot() = Some(bytes);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Single-file JSON store.
///
/// Writes go to a sibling temp file first and are renamed into place,
/// so a crash mid-write leaves the previous save intact.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProgressionState>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let persisted: PersistedState = serde_json::from_str(&contents)
            .map_err(|err| StoreError::Decode(err.to_string()))?;
        Ok(Some(ProgressionState::restore(persisted)?))
    }

    fn save(&self, state: &ProgressionState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&state.to_persisted())
            .map_err(|err| StoreError::Encode(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
