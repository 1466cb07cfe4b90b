//! `localStorage`-backed session slot.

use timekeep_auth::storage::SESSION_KEY;
use timekeep_auth::{SessionStorage, StorageError};

/// Session slot stored under one `localStorage` key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self {
            key: SESSION_KEY.to_string(),
        }
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window object".into()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for LocalStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(&self.key)
            .map_err(|e| StorageError::Io(format!("{e:?}")))
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(&self.key, blob)
            .map_err(|e| StorageError::Io(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| StorageError::Io(format!("{e:?}")))
    }
}
