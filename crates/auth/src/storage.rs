//! Persisted session slot.
//!
//! The slot holds one serialized [`UserRecord`] or nothing. The session store
//! is its only reader and writer.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use timekeep_core::{AuthError, AuthResult, UserRecord};

/// Key used by key-value backends (browser `localStorage`).
pub const SESSION_KEY: &str = "user";

/// A single key-value slot for the serialized session.
pub trait SessionStorage {
    /// Read the raw slot contents, `None` when the slot is empty.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the slot contents.
    fn save(&self, blob: &str) -> Result<(), StorageError>;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for AuthError {
    fn from(value: StorageError) -> Self {
        AuthError::storage(value.to_string())
    }
}

/// Serialize a user for the slot.
pub fn encode_user(user: &UserRecord) -> AuthResult<String> {
    serde_json::to_string(user).map_err(|e| AuthError::storage(format!("encode: {e}")))
}

/// Decode a slot blob. Anything short of a complete record is malformed.
pub fn decode_user(blob: &str) -> AuthResult<UserRecord> {
    serde_json::from_str(blob).map_err(|e| AuthError::malformed(e.to_string()))
}

/// In-process slot. Clones share the same slot, which stands in for the
/// browser's `localStorage` surviving a page reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with `blob`.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(blob.into()))),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let slot = self
            .slot
            .read()
            .map_err(|_| StorageError::Unavailable("session slot lock poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| StorageError::Unavailable("session slot lock poisoned".into()))?;
        *slot = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| StorageError::Unavailable("session slot lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::{SessionStorage, StorageError};

    /// Slot backed by one JSON file; a missing file is an empty slot.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl SessionStorage for FileStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            match std::fs::read_to_string(&self.path) {
                Ok(blob) => Ok(Some(blob)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::Io(format!("read {:?}: {e}", self.path))),
            }
        }

        fn save(&self, blob: &str) -> Result<(), StorageError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Io(format!("create {:?}: {e}", parent)))?;
            }

            // Write-then-rename so a crash never leaves a half-written record.
            let staging = self.path.with_extension("tmp");
            std::fs::write(&staging, blob)
                .map_err(|e| StorageError::Io(format!("write {:?}: {e}", staging)))?;
            std::fs::rename(&staging, &self.path)
                .map_err(|e| StorageError::Io(format!("rename {:?}: {e}", self.path)))
        }

        fn clear(&self) -> Result<(), StorageError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Io(format!("remove {:?}: {e}", self.path))),
            }
        }
    }
}
