//! Browser-local backend over `window.localStorage`.
//!
//! The handle is re-fetched on every call rather than held: `Storage` is not
//! `Send + Sync`, and the per-call cost is negligible next to serializing
//! the document.

use crate::backend::StorageBackend;
use crate::save_error::StorageError;

pub struct LocalStorageBackend;

fn storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
    window
        .local_storage()
        .map_err(|_| StorageError::Unavailable("localStorage denied".to_string()))?
        .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))
}

impl StorageBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable("localStorage read failed".to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable("localStorage write failed".to_string()))
    }
}
