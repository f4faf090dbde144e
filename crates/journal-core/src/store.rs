//! Entry store
//!
//! The `EntryStore` exclusively owns the entry list. It is hydrated from the
//! key-value store once, mutated only through `create`, `update` and
//! `delete`, and written back after every mutation.
//!
//! ## Failure policy
//!
//! - Unreadable or corrupt stored data loads as an empty list, after the
//!   stored copy has been moved aside to the backup key
//! - If that copy cannot be made, writes of the entry list are refused until
//!   a later load succeeds
//! - Failed writes leave the in-memory change in place and are reported as
//!   [`Persistence::Degraded`]
//!
//! ## Usage
//!
//! ```ignore
//! let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
//! let mut store = EntryStore::open(kv);
//!
//! let entry = store.create("Day One", "Feeling hopeful today")?.into_value();
//! let recent = store.query(&Query::new("hopeful", SortKey::Newest));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{JournalError, Outcome, Persistence};
use crate::models::{generate_id, Entry, StoredEntry};
use crate::query::Query;
use crate::stats::Stats;
use crate::storage::{KeyValueStore, StorageError, ENTRIES_BACKUP_KEY, ENTRIES_KEY};

/// Capacity of the notification channel; slow subscribers skip old events
const EVENT_CAPACITY: usize = 64;

/// Notifications emitted after mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The entry list changed and should be re-rendered
    ListChanged,
    /// Totals after the change
    StatsChanged(Stats),
    /// The list was written to storage
    Persisted,
}

/// Where the loaded list came from
#[derive(Debug)]
pub enum LoadSource {
    /// Nothing stored yet
    Empty,
    /// Parsed from storage
    Stored,
    /// Stored data could not be decoded or parsed; the raw bytes were copied
    /// to the backup key when `backed_up` is set
    Corrupt { backed_up: bool },
    /// Storage could not be read
    Unavailable(StorageError),
}

/// Summary of a load
#[derive(Debug)]
pub struct LoadReport {
    pub source: LoadSource,
    /// Entries now in the store
    pub loaded: usize,
    /// Entries that needed generated or corrected fields
    pub backfilled: usize,
    /// Stored records discarded (unparseable or without content)
    pub dropped: usize,
    /// Result of writing the repaired list back, if a repair was needed
    pub write_back: Option<Persistence>,
}

impl LoadReport {
    fn empty(source: LoadSource) -> Self {
        Self {
            source,
            loaded: 0,
            backfilled: 0,
            dropped: 0,
            write_back: None,
        }
    }
}

/// In-memory entry list mirrored to a key-value store
pub struct EntryStore {
    entries: Vec<Entry>,
    kv: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<StoreEvent>,
    /// Set when stored entries exist that were neither readable nor backed up
    write_blocked: bool,
}

impl EntryStore {
    /// Create an empty store without reading storage
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Vec::new(),
            kv,
            events,
            write_blocked: false,
        }
    }

    /// Create a store and load whatever is persisted
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(kv);
        let report = store.load();
        info!(
            "Loaded {} journal entries ({} backfilled, {} dropped)",
            report.loaded, report.backfilled, report.dropped
        );
        if let Some(Persistence::Degraded(e)) = &report.write_back {
            warn!("Repaired entries were not written back: {}", e);
        }
        store
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// The key-value store this list is mirrored to
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Replace the in-memory list with the persisted one
    ///
    /// Never fails: missing, unreadable or corrupt data yields an empty list.
    /// Legacy records are completed; if any were, the repaired list is written
    /// back so generated ids stay stable across sessions.
    pub fn load(&mut self) -> LoadReport {
        self.entries.clear();
        self.write_blocked = false;

        let raw = match self.kv.get(ENTRIES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadReport::empty(LoadSource::Empty),
            Err(e @ StorageError::InvalidEncoding { .. }) => {
                warn!("Stored journal entries are corrupt, starting empty: {}", e);
                let backed_up = self.back_up_corrupt();
                return LoadReport::empty(LoadSource::Corrupt { backed_up });
            }
            Err(e) => {
                warn!("Error loading journal entries: {}", e);
                self.back_up_corrupt();
                return LoadReport::empty(LoadSource::Unavailable(e));
            }
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored journal entries are corrupt, starting empty: {}", e);
                let backed_up = self.back_up_corrupt();
                return LoadReport::empty(LoadSource::Corrupt { backed_up });
            }
        };

        let now = Utc::now();
        let mut report = LoadReport::empty(LoadSource::Stored);
        let mut seen = HashSet::new();

        for record in records {
            let stored: StoredEntry = match serde_json::from_value(record) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Dropping unreadable journal entry: {}", e);
                    report.dropped += 1;
                    continue;
                }
            };

            let mut backfilled = stored.needs_backfill();
            let mut entry = stored.into_entry(now);

            if entry.content.trim().is_empty() {
                warn!("Dropping journal entry {} with empty content", entry.id);
                report.dropped += 1;
                continue;
            }

            if !seen.insert(entry.id.clone()) {
                let fresh = generate_id();
                warn!("Duplicate entry id {}, reassigned to {}", entry.id, fresh);
                entry.id = fresh;
                seen.insert(entry.id.clone());
                backfilled = true;
            }

            if backfilled {
                report.backfilled += 1;
            }
            self.entries.push(entry);
        }

        report.loaded = self.entries.len();

        if report.dropped > 0 {
            self.back_up_corrupt();
        }
        if report.backfilled > 0 || report.dropped > 0 {
            debug!("Writing back repaired entry list");
            report.write_back = Some(self.persist());
        }

        report
    }

    /// Copy the stored entry list aside so the next save cannot destroy it
    ///
    /// When the copy fails, entry list writes are blocked until the next load.
    fn back_up_corrupt(&mut self) -> bool {
        match self.kv.copy(ENTRIES_KEY, ENTRIES_BACKUP_KEY) {
            Ok(backed_up) => backed_up,
            Err(e) => {
                warn!("Could not back up corrupt journal entries: {}", e);
                self.write_blocked = true;
                false
            }
        }
    }

    // ==================== Mutations ====================

    /// Create a new entry at the front of the list
    pub fn create(&mut self, title: &str, content: &str) -> Result<Outcome<Entry>, JournalError> {
        self.create_at(title, content, Utc::now())
    }

    /// Create a new entry with an explicit creation time
    pub fn create_at(
        &mut self,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Entry>, JournalError> {
        if content.trim().is_empty() {
            return Err(JournalError::EmptyContent);
        }

        let entry = Entry::new(title, content, now);
        debug!("Created entry {} ({} words)", entry.id, entry.word_count);
        self.entries.insert(0, entry.clone());

        let persistence = self.commit();
        Ok(Outcome::new(entry, persistence))
    }

    /// Replace the title and content of an existing entry
    pub fn update(
        &mut self,
        id: &str,
        title: &str,
        content: &str,
    ) -> Result<Outcome<Entry>, JournalError> {
        self.update_at(id, title, content, Utc::now())
    }

    /// Update an entry with an explicit modification time
    pub fn update_at(
        &mut self,
        id: &str,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Entry>, JournalError> {
        let index = self
            .position(id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;

        if content.trim().is_empty() {
            return Err(JournalError::EmptyContent);
        }

        let entry = &mut self.entries[index];
        entry.rewrite(title, content, now);
        let updated = entry.clone();
        debug!("Updated entry {}", updated.id);

        let persistence = self.commit();
        Ok(Outcome::new(updated, persistence))
    }

    /// Remove an entry. Deleting an unknown id is a no-op.
    ///
    /// The returned value tells whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Outcome<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;

        if removed {
            debug!("Deleted entry {}", id);
            Outcome::new(true, self.commit())
        } else {
            Outcome::new(false, self.persist())
        }
    }

    // ==================== Queries ====================

    /// Point lookup by id
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries in storage order (newest created first)
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search and sort the list
    pub fn query(&self, query: &Query) -> Vec<&Entry> {
        query.apply(&self.entries)
    }

    /// Totals over the current list
    pub fn stats(&self) -> Stats {
        Stats::compute(&self.entries)
    }

    // ==================== Persistence ====================

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Persist, then notify subscribers
    fn commit(&mut self) -> Persistence {
        let persistence = self.persist();
        self.notify(StoreEvent::ListChanged);
        self.notify(StoreEvent::StatsChanged(self.stats()));
        persistence
    }

    /// Write the list to storage
    fn persist(&self) -> Persistence {
        if self.write_blocked {
            warn!("Not saving journal entries over an unreadable stored copy");
            return Persistence::Degraded(StorageError::WriteBlocked {
                key: ENTRIES_KEY.to_string(),
            });
        }

        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Error serializing journal entries: {}", e);
                return Persistence::Degraded(StorageError::Serialize {
                    key: ENTRIES_KEY.to_string(),
                    source: e,
                });
            }
        };

        match self.kv.set(ENTRIES_KEY, &json) {
            Ok(()) => {
                self.notify(StoreEvent::Persisted);
                Persistence::Saved
            }
            Err(e) => {
                warn!("Error saving journal entries: {}", e);
                Persistence::Degraded(e)
            }
        }
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
