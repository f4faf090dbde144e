//! Background autosave task
//!
//! Runs the debounce state machine on a tokio task. Keystrokes arrive over a
//! command channel; each one re-arms the timer, so only the last keystroke
//! before a quiet period writes the draft.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::autosave::{Autosave, AutosaveState, AutosaveTick};
use super::DraftSlot;
use crate::models::Draft;

/// Commands sent to the autosave task
#[derive(Debug, Clone)]
pub enum AutosaveCommand {
    /// The input fields changed
    Keystroke { title: String, content: String },
    /// Drop the pending write and remove the stored draft
    Clear,
    /// Write any pending draft and stop
    Shutdown,
}

impl AutosaveCommand {
    pub fn keystroke(title: impl Into<String>, content: impl Into<String>) -> Self {
        AutosaveCommand::Keystroke {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Events emitted by the autosave task
#[derive(Debug, Clone)]
pub enum AutosaveEvent {
    /// Draft written; drives the autosave indicator
    Saved(Draft),
    /// Stored draft removed
    Cleared,
    /// A write or clear failed
    Failed(String),
}

/// Handle to control the autosave task
pub struct AutosaveHandle {
    /// Send commands to the task
    pub command_tx: mpsc::Sender<AutosaveCommand>,
    /// Receive events from the task
    pub event_rx: mpsc::Receiver<AutosaveEvent>,
    /// Watch the debounce state
    pub state_rx: watch::Receiver<AutosaveState>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Flush any pending draft and wait for the task to stop
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(AutosaveCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!("Autosave task ended abnormally: {}", e);
        }
    }
}

/// Spawn the autosave task
///
/// Must be called from within a tokio runtime.
pub fn spawn_autosave(slot: DraftSlot, delay: Duration) -> AutosaveHandle {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::channel(64);
    let (state_tx, state_rx) = watch::channel(AutosaveState::Idle);

    let task = tokio::spawn(autosave_loop(
        slot,
        Autosave::new(delay),
        command_rx,
        event_tx,
        state_tx,
    ));

    AutosaveHandle {
        command_tx,
        event_rx,
        state_rx,
        task,
    }
}

async fn autosave_loop(
    slot: DraftSlot,
    mut autosave: Autosave,
    mut command_rx: mpsc::Receiver<AutosaveCommand>,
    event_tx: mpsc::Sender<AutosaveEvent>,
    state_tx: watch::Sender<AutosaveState>,
) {
    loop {
        let deadline = autosave.deadline();

        tokio::select! {
            command = command_rx.recv() => match command {
                Some(AutosaveCommand::Keystroke { title, content }) => {
                    autosave.input(&title, &content, Instant::now());
                }
                Some(AutosaveCommand::Clear) => {
                    autosave.reset();
                    let event = match slot.clear() {
                        Ok(()) => AutosaveEvent::Cleared,
                        Err(e) => {
                            warn!("Error clearing draft: {}", e);
                            AutosaveEvent::Failed(e.to_string())
                        }
                    };
                    let _ = event_tx.send(event).await;
                }
                Some(AutosaveCommand::Shutdown) | None => {
                    if let Some(tick) = autosave.flush(&slot) {
                        emit(&event_tx, tick).await;
                    }
                    let _ = state_tx.send(autosave.state());
                    debug!("Autosave task stopped");
                    return;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(tick) = autosave.poll(Instant::now(), &slot) {
                    emit(&event_tx, tick).await;
                }
            }
        }

        let _ = state_tx.send(autosave.state());
    }
}

async fn emit(event_tx: &mpsc::Sender<AutosaveEvent>, tick: AutosaveTick) {
    let event = match tick {
        AutosaveTick::Saved(draft) => AutosaveEvent::Saved(draft),
        AutosaveTick::Failed(e) => AutosaveEvent::Failed(e.to_string()),
        AutosaveTick::Skipped => return,
    };
    let _ = event_tx.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, DRAFT_KEY};
    use std::sync::Arc;

    fn slot() -> (Arc<MemoryStore>, DraftSlot) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), DraftSlot::new(kv))
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_write_after_pause() {
        let (kv, slot) = slot();
        let mut handle = spawn_autosave(slot, Duration::from_secs(1));

        for text in ["F", "Fe", "Feeling"] {
            handle
                .command_tx
                .send(AutosaveCommand::keystroke("", text))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert!(kv.get(DRAFT_KEY).unwrap().is_none());

        match handle.event_rx.recv().await.unwrap() {
            AutosaveEvent::Saved(draft) => assert_eq!(draft.content, "Feeling"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(kv.get(DRAFT_KEY).unwrap().unwrap().contains("Feeling"));
        handle
            .state_rx
            .wait_for(|state| *state == AutosaveState::Saved)
            .await
            .unwrap();

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_write() {
        let (kv, slot) = slot();
        let mut handle = spawn_autosave(slot, Duration::from_secs(1));

        handle
            .command_tx
            .send(AutosaveCommand::keystroke("Title", "body"))
            .await
            .unwrap();
        handle.command_tx.send(AutosaveCommand::Clear).await.unwrap();

        assert!(matches!(
            handle.event_rx.recv().await.unwrap(),
            AutosaveEvent::Cleared
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.event_rx.try_recv().is_err());
        assert!(kv.get(DRAFT_KEY).unwrap().is_none());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_draft() {
        let (kv, slot) = slot();
        let handle = spawn_autosave(slot, Duration::from_secs(60));

        handle
            .command_tx
            .send(AutosaveCommand::keystroke("", "unsaved thought"))
            .await
            .unwrap();
        handle.shutdown().await;

        let raw = kv.get(DRAFT_KEY).unwrap().unwrap();
        assert!(raw.contains("unsaved thought"));
    }
}
