//! Debounce state machine for draft autosave
//!
//! Driven by explicit instants so the same logic serves the async task and
//! synchronous callers that poll on their own event loop.

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::DraftSlot;
use crate::models::Draft;
use crate::storage::StorageError;

/// Quiet period after the last keystroke before the draft is written
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(1);

/// Autosave lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// Nothing waiting to be written
    Idle,
    /// A write is scheduled for the deadline
    Pending,
    /// The latest input is in the draft slot
    Saved,
}

/// Result of a timer firing
#[derive(Debug)]
pub enum AutosaveTick {
    /// Draft written to the slot
    Saved(Draft),
    /// Fields were blank, nothing written
    Skipped,
    /// Storage rejected the write; the buffered fields are kept
    Failed(StorageError),
}

/// Debounced draft writer
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    state: AutosaveState,
    deadline: Option<Instant>,
    title: String,
    content: String,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: AutosaveState::Idle,
            deadline: None,
            title: String::new(),
            content: String::new(),
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the pending write fires, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record the current field values and re-arm the timer
    ///
    /// Replaces any earlier pending write. Two empty fields cancel instead.
    pub fn input(&mut self, title: &str, content: &str, now: Instant) {
        self.title = title.to_string();
        self.content = content.to_string();

        if title.is_empty() && content.is_empty() {
            self.reset();
            return;
        }

        self.deadline = Some(now + self.delay);
        self.state = AutosaveState::Pending;
    }

    /// Fire the pending write if its deadline has passed
    pub fn poll(&mut self, now: Instant, slot: &DraftSlot) -> Option<AutosaveTick> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(slot),
            _ => None,
        }
    }

    /// Fire the pending write immediately, ignoring the deadline
    pub fn flush(&mut self, slot: &DraftSlot) -> Option<AutosaveTick> {
        self.deadline.take()?;

        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            self.state = AutosaveState::Idle;
            return Some(AutosaveTick::Skipped);
        }

        let draft = Draft::new(self.title.clone(), self.content.clone(), Utc::now());
        match slot.save(&draft) {
            Ok(()) => {
                debug!("Draft autosaved ({} words)", draft.word_count());
                self.state = AutosaveState::Saved;
                Some(AutosaveTick::Saved(draft))
            }
            Err(e) => {
                warn!("Error saving draft: {}", e);
                self.state = AutosaveState::Idle;
                Some(AutosaveTick::Failed(e))
            }
        }
    }

    /// Drop any pending write and return to `Idle`
    ///
    /// Called after the draft became an entry or was cleared by the user.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.state = AutosaveState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, DRAFT_KEY};
    use std::sync::Arc;

    fn slot_with(kv: Arc<MemoryStore>) -> DraftSlot {
        DraftSlot::new(kv)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_keystroke_arms_timer() {
        let mut autosave = Autosave::default();
        let start = Instant::now();

        autosave.input("", "h", start);

        assert_eq!(autosave.state(), AutosaveState::Pending);
        assert_eq!(autosave.deadline(), Some(start + DEFAULT_AUTOSAVE_DELAY));
    }

    #[test]
    fn test_only_last_keystroke_fires() {
        let kv = Arc::new(MemoryStore::new());
        let slot = slot_with(kv.clone());
        let mut autosave = Autosave::new(ms(1000));
        let start = Instant::now();

        autosave.input("", "h", start);
        autosave.input("", "he", start + ms(600));
        autosave.input("", "hello", start + ms(1200));

        // First keystroke's deadline has passed but it was superseded
        assert!(autosave.poll(start + ms(1100), &slot).is_none());
        assert!(autosave.poll(start + ms(2100), &slot).is_none());
        assert!(kv.get(DRAFT_KEY).unwrap().is_none());

        match autosave.poll(start + ms(2200), &slot) {
            Some(AutosaveTick::Saved(draft)) => assert_eq!(draft.content, "hello"),
            other => panic!("expected save, got {:?}", other),
        }
        assert_eq!(autosave.state(), AutosaveState::Saved);
        assert_eq!(slot.load().unwrap().unwrap().content, "hello");

        // Fired once; nothing left to do
        assert!(autosave.poll(start + ms(5000), &slot).is_none());
    }

    #[test]
    fn test_blank_fields_skip_write() {
        let kv = Arc::new(MemoryStore::new());
        let slot = slot_with(kv.clone());
        let mut autosave = Autosave::new(ms(10));
        let start = Instant::now();

        autosave.input("  ", "\n", start);
        assert!(matches!(
            autosave.poll(start + ms(10), &slot),
            Some(AutosaveTick::Skipped)
        ));
        assert_eq!(autosave.state(), AutosaveState::Idle);
        assert!(kv.get(DRAFT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_clearing_fields_cancels() {
        let slot = slot_with(Arc::new(MemoryStore::new()));
        let mut autosave = Autosave::new(ms(10));
        let start = Instant::now();

        autosave.input("T", "", start);
        autosave.input("", "", start + ms(5));

        assert_eq!(autosave.state(), AutosaveState::Idle);
        assert!(autosave.deadline().is_none());
        assert!(autosave.poll(start + ms(100), &slot).is_none());
    }

    #[test]
    fn test_storage_failure_keeps_fields() {
        let kv = Arc::new(MemoryStore::with_quota(4));
        let slot = slot_with(kv);
        let mut autosave = Autosave::new(ms(10));
        let start = Instant::now();

        autosave.input("Title", "will not fit", start);
        assert!(matches!(
            autosave.poll(start + ms(10), &slot),
            Some(AutosaveTick::Failed(StorageError::QuotaExceeded { .. }))
        ));
        assert_eq!(autosave.state(), AutosaveState::Idle);

        // The buffered text is written once space allows a retry via new input
        let slot = slot_with(Arc::new(MemoryStore::new()));
        autosave.input("Title", "will not fit", start + ms(20));
        assert!(matches!(
            autosave.flush(&slot),
            Some(AutosaveTick::Saved(_))
        ));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let slot = slot_with(Arc::new(MemoryStore::new()));
        let mut autosave = Autosave::new(ms(10));
        let start = Instant::now();

        autosave.input("", "text", start);
        autosave.reset();

        assert_eq!(autosave.state(), AutosaveState::Idle);
        assert!(autosave.flush(&slot).is_none());
    }
}
