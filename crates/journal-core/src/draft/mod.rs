//! Draft autosave
//!
//! A single draft slot holds the unsaved title and content while the user
//! types. Writes are debounced: each keystroke re-arms a timer and only the
//! last one writes.
//!
//! ## Components
//!
//! - `DraftSlot`: load/save/clear of the draft key
//! - `Autosave`: clock-driven debounce state machine (`Idle -> Pending -> Saved`)
//! - `spawn_autosave`: runs the state machine on a tokio task
//!
//! ## Usage
//!
//! ```ignore
//! let handle = spawn_autosave(slot, Duration::from_secs(1));
//! handle.command_tx.send(AutosaveCommand::keystroke("Title", "Body")).await?;
//! ```

mod autosave;
mod task;

use std::sync::Arc;

use tracing::warn;

use crate::models::Draft;
use crate::storage::{KeyValueStore, StorageError, StorageResult, DRAFT_KEY};

pub use autosave::{Autosave, AutosaveState, AutosaveTick, DEFAULT_AUTOSAVE_DELAY};
pub use task::{spawn_autosave, AutosaveCommand, AutosaveEvent, AutosaveHandle};

/// The single draft slot in storage
#[derive(Clone)]
pub struct DraftSlot {
    kv: Arc<dyn KeyValueStore>,
}

impl DraftSlot {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the stored draft
    ///
    /// A draft that cannot be parsed reads as absent.
    pub fn load(&self) -> StorageResult<Option<Draft>> {
        let Some(raw) = self.kv.get(DRAFT_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!("Error loading draft: {}", e);
                Ok(None)
            }
        }
    }

    /// Overwrite the slot with `draft`
    pub fn save(&self, draft: &Draft) -> StorageResult<()> {
        let json = serde_json::to_string(draft).map_err(|e| StorageError::Serialize {
            key: DRAFT_KEY.to_string(),
            source: e,
        })?;
        self.kv.set(DRAFT_KEY, &json)
    }

    /// Remove the draft. Clearing an empty slot succeeds.
    pub fn clear(&self) -> StorageResult<()> {
        self.kv.remove(DRAFT_KEY)
    }
}
