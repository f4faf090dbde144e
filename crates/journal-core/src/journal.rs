//! Journal session
//!
//! Ties the entry store and the draft slot to one key-value store. This is
//! what a front end holds: saving an entry also clears the draft, and the
//! autosave task is spawned against the same storage.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::warn;

use crate::config::Config;
use crate::draft::{spawn_autosave, Autosave, AutosaveHandle, DraftSlot};
use crate::error::{JournalError, Outcome, Persistence};
use crate::export::{export, ExportedEntry};
use crate::models::{Draft, Entry};
use crate::storage::{FileStore, KeyValueStore};
use crate::store::EntryStore;

/// A journal backed by one key-value store
pub struct Journal {
    store: EntryStore,
    drafts: DraftSlot,
    autosave_delay: Duration,
}

impl Journal {
    /// Open the journal from the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::open_with_config(&config))
    }

    /// Open the journal in the configured data directory
    pub fn open_with_config(config: &Config) -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_storage(kv, config.autosave_delay())
    }

    /// Open the journal over an arbitrary key-value store
    pub fn with_storage(kv: Arc<dyn KeyValueStore>, autosave_delay: Duration) -> Self {
        Self {
            store: EntryStore::open(kv.clone()),
            drafts: DraftSlot::new(kv),
            autosave_delay,
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntryStore {
        &mut self.store
    }

    pub fn drafts(&self) -> &DraftSlot {
        &self.drafts
    }

    pub fn autosave_delay(&self) -> Duration {
        self.autosave_delay
    }

    /// Create an entry from the input fields and clear the draft
    ///
    /// The draft is kept when the entry is rejected.
    pub fn save_entry(&mut self, title: &str, content: &str) -> Result<Outcome<Entry>, JournalError> {
        let outcome = self.store.create(title, content)?;
        self.discard_draft();
        Ok(outcome)
    }

    /// Draft to pre-fill the input fields with, if one was saved
    pub fn restore_draft(&self) -> Option<Draft> {
        match self.drafts.load() {
            Ok(draft) => draft.filter(|d| !d.is_blank()),
            Err(e) => {
                warn!("Error loading draft: {}", e);
                None
            }
        }
    }

    /// Store the current input fields as the draft right away
    pub fn save_draft(&self, title: &str, content: &str) -> Persistence {
        let draft = Draft::new(title, content, Utc::now());
        match self.drafts.save(&draft) {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                warn!("Error saving draft: {}", e);
                Persistence::Degraded(e)
            }
        }
    }

    /// Remove the stored draft
    pub fn discard_draft(&self) -> Persistence {
        match self.drafts.clear() {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                warn!("Error clearing draft: {}", e);
                Persistence::Degraded(e)
            }
        }
    }

    /// A debounce state machine for callers driving their own event loop
    pub fn autosave(&self) -> Autosave {
        Autosave::new(self.autosave_delay)
    }

    /// Start the background autosave task. Requires a tokio runtime.
    pub fn spawn_autosave(&self) -> AutosaveHandle {
        spawn_autosave(self.drafts.clone(), self.autosave_delay)
    }

    /// Render an entry as a detached text file
    pub fn export(&self, id: &str) -> Result<ExportedEntry, JournalError> {
        let entry = self
            .store
            .get(id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        Ok(export(entry, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::AutosaveTick;
    use crate::storage::{MemoryStore, DRAFT_KEY, ENTRIES_KEY};
    use tempfile::TempDir;
    use tokio::time::Instant;

    fn journal() -> (Arc<MemoryStore>, Journal) {
        let kv = Arc::new(MemoryStore::new());
        let journal = Journal::with_storage(kv.clone(), Duration::from_millis(1000));
        (kv, journal)
    }

    #[test]
    fn test_autosave_then_create_clears_draft() {
        let (kv, mut journal) = journal();
        let mut autosave = journal.autosave();
        let start = Instant::now();

        autosave.input("Day One", "Feeling hopeful", start);
        assert!(autosave
            .poll(start + Duration::from_millis(999), journal.drafts())
            .is_none());
        assert!(matches!(
            autosave.poll(start + Duration::from_millis(1000), journal.drafts()),
            Some(AutosaveTick::Saved(_))
        ));
        assert!(kv.get(DRAFT_KEY).unwrap().is_some());

        journal.save_entry("Day One", "Feeling hopeful").unwrap();
        autosave.reset();

        assert!(kv.get(DRAFT_KEY).unwrap().is_none());
        assert!(kv.get(ENTRIES_KEY).unwrap().is_some());
        assert_eq!(journal.store().len(), 1);
    }

    #[test]
    fn test_rejected_save_keeps_draft() {
        let (kv, mut journal) = journal();
        journal.save_draft("Only a title", "");

        let err = journal.save_entry("Only a title", "   ").unwrap_err();

        assert_eq!(err, JournalError::EmptyContent);
        assert!(kv.get(DRAFT_KEY).unwrap().is_some());
    }

    #[test]
    fn test_restore_draft() {
        let (_, journal) = journal();
        assert!(journal.restore_draft().is_none());

        assert!(journal.save_draft("Title", "content").is_saved());
        let draft = journal.restore_draft().unwrap();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.content, "content");

        journal.discard_draft();
        assert!(journal.restore_draft().is_none());
    }

    #[test]
    fn test_blank_draft_is_not_restored() {
        let (_, journal) = journal();
        journal.save_draft("  ", "");
        assert!(journal.restore_draft().is_none());
    }

    #[test]
    fn test_export_unknown_entry() {
        let (_, journal) = journal();
        assert_eq!(
            journal.export("nope").unwrap_err(),
            JournalError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_open_with_config_persists_to_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        {
            let mut journal = Journal::open_with_config(&config);
            journal.save_entry("Kept", "across sessions").unwrap();
        }

        let journal = Journal::open_with_config(&config);
        assert_eq!(journal.store().entries()[0].title, "Kept");
        assert!(temp_dir.path().join(ENTRIES_KEY).exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_autosave_uses_journal_storage() {
        let (kv, journal) = journal();
        let mut handle = journal.spawn_autosave();

        handle
            .command_tx
            .send(crate::draft::AutosaveCommand::keystroke("", "typed"))
            .await
            .unwrap();
        let event = handle.event_rx.recv().await.unwrap();

        assert!(matches!(event, crate::draft::AutosaveEvent::Saved(_)));
        assert!(kv.get(DRAFT_KEY).unwrap().is_some());
        handle.shutdown().await;
    }
}
