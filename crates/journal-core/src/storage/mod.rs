//! Storage layer
//!
//! A synchronous string-keyed key-value store. Entries and the draft are kept
//! under two independent keys, each holding a JSON document.
//!
//! ## Backends
//!
//! - **FileStore**: one file per key in the data directory, atomic writes
//! - **MemoryStore**: in-process map with an optional byte quota

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized entry list
pub const ENTRIES_KEY: &str = "journalEntries";

/// Key holding the in-progress draft
pub const DRAFT_KEY: &str = "journalDraft";

/// Key receiving an unreadable entry list before it gets overwritten
pub const ENTRIES_BACKUP_KEY: &str = "journalEntries.corrupt";

/// Synchronous string-keyed storage
///
/// Every call may fail; callers decide whether a failure degrades or aborts.
/// Methods take `&self` so one store can be shared between the entry store
/// and the autosave task.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Copy the stored value of `from` to `to` unchanged
    ///
    /// Returns `false` when `from` holds nothing. Backends that can copy
    /// undecodable values byte for byte override this.
    fn copy(&self, from: &str, to: &str) -> StorageResult<bool> {
        match self.get(from)? {
            Some(value) => {
                self.set(to, &value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
