//! Storage backends and the dual-store policy layer.
//!
//! A backend is a string key-value store. `SaveStores` wraps a mandatory
//! local backend and an optional cloud backend and encodes the session
//! policy: cloud-first on load, write-through on save, and a terminal
//! `cloud_enabled` flag — the first cloud error of any kind disables cloud
//! for the rest of the session, with no retry. Recovery means reloading the
//! game.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bevy::prelude::*;

use crate::save_error::StorageError;

/// The single key every backend stores the save document under.
pub const SAVE_KEY: &str = "forgeland_save";

/// A string key-value store. Implementations must be cheap to call; the
/// debounce layer already throttles write frequency.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// Lets tests and the embedding shell keep a handle to a backend they hand
// to `SaveStores`.
impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// MemoryBackend
// =============================================================================

/// In-memory backend for tests and as a stand-in cloud store.
#[derive(Default)]
pub struct MemoryBackend {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .map
            .lock()
            .map_err(|_| StorageError::Unavailable("poisoned lock".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StorageError::Unavailable("poisoned lock".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A backend that fails every call. Test double for the degraded-cloud
/// policies.
#[cfg(test)]
pub struct FailingBackend;

#[cfg(test)]
impl StorageBackend for FailingBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("always down".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("always down".to_string()))
    }
}

// =============================================================================
// FileBackend (native)
// =============================================================================

/// One file per key under a base directory, written with the tmp+rename
/// pattern so a crash mid-write can never corrupt the previous document.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileBackend {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileBackend {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        use std::io::Write;

        std::fs::create_dir_all(&self.dir)?;
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));

        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, final_path)?;
        Ok(())
    }
}

// =============================================================================
// SaveStores
// =============================================================================

/// The injected pair of stores plus the session cloud flag. The embedding
/// shell builds this before adding `SavePlugin`; headless runs get a
/// file-backed local store and no cloud.
#[derive(Resource)]
pub struct SaveStores {
    local: Box<dyn StorageBackend>,
    cloud: Option<Box<dyn StorageBackend>>,
    cloud_enabled: bool,
}

impl SaveStores {
    pub fn new(local: Box<dyn StorageBackend>, cloud: Option<Box<dyn StorageBackend>>) -> Self {
        let cloud_enabled = cloud.is_some();
        Self {
            local,
            cloud,
            cloud_enabled,
        }
    }

    pub fn cloud_enabled(&self) -> bool {
        self.cloud_enabled
    }

    /// Loads the save document: cloud first while enabled, local otherwise.
    ///
    /// Any cloud error permanently disables cloud for the session and falls
    /// through to local. A cloud miss (no document) also falls through —
    /// a fresh cloud account must not shadow an existing local save.
    pub fn load(&mut self) -> Option<String> {
        if self.cloud_enabled {
            if let Some(cloud) = &self.cloud {
                match cloud.get(SAVE_KEY) {
                    Ok(Some(document)) => return Some(document),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("cloud load failed, disabling cloud for this session: {e}");
                        self.cloud_enabled = false;
                    }
                }
            }
        }
        match self.local.get(SAVE_KEY) {
            Ok(document) => document,
            Err(e) => {
                warn!("local load failed: {e}");
                None
            }
        }
    }

    /// Write-through save. The local write always happens; a cloud failure
    /// disables cloud for the session and never surfaces to the caller.
    pub fn save(&mut self, document: &str) {
        if let Err(e) = self.local.set(SAVE_KEY, document) {
            warn!("local save failed: {e}");
        }
        if self.cloud_enabled {
            if let Some(cloud) = &self.cloud {
                if let Err(e) = cloud.set(SAVE_KEY, document) {
                    warn!("cloud save failed, disabling cloud for this session: {e}");
                    self.cloud_enabled = false;
                }
            }
        }
    }

    /// Teardown write: local only, best-effort. Used on app exit, where a
    /// slow or failing cloud store must not delay shutdown.
    pub fn teardown_save(&mut self, document: &str) {
        if let Err(e) = self.local.set(SAVE_KEY, document) {
            warn!("teardown save failed: {e}");
        }
    }
}
