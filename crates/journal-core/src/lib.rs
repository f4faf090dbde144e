//! Journal Core Library
//!
//! This crate provides the core functionality for journal, a local-first
//! personal journaling tool.
//!
//! # Architecture
//!
//! - **EntryStore**: owns the entry list, mirrored to a key-value store as JSON
//! - **Query**: stateless search and sort over entries
//! - **Draft autosave**: single draft slot written on a debounce timer
//!
//! Data flows one way: front end -> store/query -> storage.
//!
//! # Quick Start
//!
//! ```text
//! let mut journal = Journal::open()?;
//!
//! // Save an entry (also clears the draft)
//! journal.save_entry("Day One", "Feeling hopeful today")?;
//!
//! // Query entries
//! let entries = journal.store().query(&Query::new("hopeful", SortKey::Newest));
//! ```
//!
//! # Modules
//!
//! - `journal`: Session controller (main entry point)
//! - `store`: Entry lifecycle and change notifications
//! - `models`: Entry and Draft
//! - `query`: Search and sort
//! - `draft`: Draft slot and debounced autosave
//! - `stats`: Entry, word and day totals
//! - `export`: Plain-text export and date formatting
//! - `storage`: Key-value persistence
//! - `config`: Application configuration

pub mod config;
pub mod draft;
pub mod error;
pub mod export;
pub mod journal;
pub mod models;
pub mod query;
pub mod stats;
pub mod storage;
pub mod store;

pub use config::Config;
pub use draft::{AutosaveCommand, AutosaveEvent, AutosaveHandle, AutosaveState, DraftSlot};
pub use error::{JournalError, Outcome, Persistence};
pub use export::ExportedEntry;
pub use journal::Journal;
pub use models::{Draft, Entry};
pub use query::{Query, SortKey};
pub use stats::Stats;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{EntryStore, LoadReport, LoadSource, StoreEvent};
