//! Storage error handling
//!
//! Provides typed errors for key-value storage operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or the store's quota is exhausted
    #[error("Storage quota exceeded while writing '{key}'. Free up space and try again.")]
    QuotaExceeded { key: String },

    /// Failed to read a stored value
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key cannot be mapped onto the backing store
    #[error("Invalid storage key: '{key}'")]
    InvalidKey { key: String },

    /// Value could not be serialized before writing
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes are not valid UTF-8
    #[error("Stored data in '{path}' is not valid UTF-8")]
    InvalidEncoding { path: PathBuf },

    /// Writing would replace stored data that could neither be read nor backed up
    #[error("Refusing to overwrite '{key}': the stored copy could not be read or backed up")]
    WriteBlocked { key: String },
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StorageError::QuotaExceeded {
                key: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::QuotaExceeded { .. } => {
                Some("Free up disk space or export and delete old entries.")
            }
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the journal data directory.")
            }
            StorageError::WriteBlocked { .. } => {
                Some("Move the unreadable file out of the data directory, then try again.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/journalEntries"));

        match err {
            StorageError::QuotaExceeded { ref key } => assert_eq!(key, "journalEntries"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_other_io_is_write_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "device busy");
        let err = StorageError::from_io(io_err, PathBuf::from("/busy"));

        assert!(matches!(err, StorageError::WriteError { .. }));
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidKey {
            key: "../escape".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Invalid storage key"));
        assert!(msg.contains("../escape"));
    }

    #[test]
    fn test_write_blocked_has_suggestion() {
        let err = StorageError::WriteBlocked {
            key: "journalEntries".to_string(),
        };

        assert!(err.to_string().contains("journalEntries"));
        assert!(err.recovery_suggestion().is_some());
    }
}
