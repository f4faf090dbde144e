//! Journal operation errors
//!
//! Validation rejections only. Storage failures never abort an entry
//! operation; they are reported through [`Persistence::Degraded`].

use thiserror::Error;

use crate::storage::StorageError;

/// Reasons an entry operation is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// Entry content was empty after trimming
    #[error("Entry content cannot be empty")]
    EmptyContent,

    /// No entry has the given id
    #[error("Entry not found: {0}")]
    NotFound(String),
}

/// Whether a mutation reached storage
#[derive(Debug)]
pub enum Persistence {
    /// The change was written to storage
    Saved,
    /// The change lives in memory only for this session
    Degraded(StorageError),
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// The value produced by a mutation together with its persistence status
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub persistence: Persistence,
}

impl<T> Outcome<T> {
    pub fn new(value: T, persistence: Persistence) -> Self {
        Self { value, persistence }
    }

    /// True when the in-memory change could not be written out
    pub fn is_degraded(&self) -> bool {
        !self.persistence.is_saved()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
