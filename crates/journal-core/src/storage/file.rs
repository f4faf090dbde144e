//! File-backed key-value store
//!
//! Each key maps to a file of the same name inside the data directory.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/journal/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::KeyValueStore;

/// Key-value store persisted as files in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored keys
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the file path for a key
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        let Some(bytes) = read_bytes(&path)? else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::InvalidEncoding { path })
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes())?;
        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    fn copy(&self, from: &str, to: &str) -> StorageResult<bool> {
        let source = self.path_for(from)?;
        let target = self.path_for(to)?;
        match read_bytes(&source)? {
            Some(bytes) => {
                atomic_write(&target, &bytes)?;
                debug!("Copied {:?} to {:?}", source, target);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Read a file's raw bytes, `None` if it does not exist
fn read_bytes(path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(StorageError::PermissionDenied {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) => Err(StorageError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Keys become file names, so anything that could escape the directory is rejected
fn validate_key(key: &str) -> StorageResult<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.ends_with(".tmp")
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::from_io(e, path.to_path_buf())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.get("journalEntries").unwrap().is_none());
    }

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("journalDraft", "{\"title\":\"x\"}").unwrap();
        assert_eq!(
            store.get("journalDraft").unwrap().as_deref(),
            Some("{\"title\":\"x\"}")
        );

        store.set("journalDraft", "replaced").unwrap();
        assert_eq!(store.get("journalDraft").unwrap().as_deref(), Some("replaced"));

        store.remove("journalDraft").unwrap();
        assert!(store.get("journalDraft").unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn test_creates_data_dir_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileStore::new(&nested);

        store.set("journalEntries", "[]").unwrap();

        assert!(nested.join("journalEntries").exists());
        assert!(!nested.join("journalEntries.tmp").exists());
    }

    #[test]
    fn test_invalid_utf8_is_reported_and_copied_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        let raw = b"[{\"content\":\"caf\xff\xfe\"}]".to_vec();
        fs::write(temp_dir.path().join("journalEntries"), &raw).unwrap();

        let err = store.get("journalEntries").unwrap_err();
        assert!(matches!(err, StorageError::InvalidEncoding { .. }));

        assert!(store.copy("journalEntries", "journalEntries.corrupt").unwrap());
        let copied = fs::read(temp_dir.path().join("journalEntries.corrupt")).unwrap();
        assert_eq!(copied, raw);
    }

    #[test]
    fn test_copy_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(!store.copy("journalEntries", "journalEntries.corrupt").unwrap());
        assert!(store.get("journalEntries.corrupt").unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        for key in ["", "..", "../outside", "a/b", "a\\b", "x.tmp"] {
            let err = store.set(key, "data").unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey { .. }), "key {:?}", key);
        }
    }
}
