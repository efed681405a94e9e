// ---------------------------------------------------------------------------
// Error types for save/load and the persistence backends
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors a storage backend can report.
///
/// The policies in `SaveStores` convert these into degraded-backend state;
/// they never reach gameplay code.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The platform store is unavailable (no window.localStorage, quota
    /// exceeded, remote store unreachable).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Errors from the save/load pipelines themselves.
#[derive(Debug)]
pub enum SaveError {
    /// Serializing the save document failed.
    Encode(String),
    /// A required resource was missing from the ECS world.
    MissingResource(String),
    /// A backend error that needed to surface past the policy layer.
    Storage(StorageError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::MissingResource(name) => {
                write!(f, "Missing required resource: {name}")
            }
            SaveError::Storage(e) => write!(f, "Storage error: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for SaveError {
    fn from(e: StorageError) -> Self {
        SaveError::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_io() {
        let err = StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_storage_error_display_unavailable() {
        let err = StorageError::Unavailable("no localStorage".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("unavailable"), "got: {msg}");
    }

    #[test]
    fn test_save_error_source_chain() {
        let err = SaveError::Storage(StorageError::Unavailable("down".to_string()));
        assert!(std::error::Error::source(&err).is_some());
        let err = SaveError::Encode("bad".to_string());
        assert!(std::error::Error::source(&err).is_none());
    }
}
