//! Data models for the journal
//!
//! Defines the core data structures: Entry and Draft.
//! Both serialize to camelCase JSON so stored data stays readable by older
//! builds.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier, never reused
    pub id: String,
    /// Display title, may be empty
    pub title: String,
    /// Entry text, never empty after trimming
    pub content: String,
    /// When this entry was created
    pub created_at: DateTime<Utc>,
    /// When this entry was last written
    pub last_modified: DateTime<Utc>,
    /// Whitespace-delimited token count of `content`
    pub word_count: usize,
}

impl Entry {
    /// Build an entry from raw input. Title and content are trimmed.
    ///
    /// Does not validate; the store rejects empty content before calling this.
    pub(crate) fn new(title: &str, content: &str, now: DateTime<Utc>) -> Self {
        let content = content.trim().to_string();
        Self {
            id: generate_id(),
            title: title.trim().to_string(),
            word_count: count_words(&content),
            content,
            created_at: now,
            last_modified: now,
        }
    }

    /// Replace title and content, keeping `id` and `created_at`
    pub(crate) fn rewrite(&mut self, title: &str, content: &str, now: DateTime<Utc>) {
        self.title = title.trim().to_string();
        self.content = content.trim().to_string();
        self.word_count = count_words(&self.content);
        self.last_modified = now;
    }

    /// Title to show, falling back to "Untitled Entry"
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled Entry"
        } else {
            &self.title
        }
    }
}

/// An entry as it may appear in storage written by older versions
///
/// Every field is optional; `into_entry` fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "date")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub word_count: Option<usize>,
}

impl StoredEntry {
    /// Whether any field had to be filled in or corrected
    pub fn needs_backfill(&self) -> bool {
        let content = self.content.as_deref().unwrap_or("");
        self.id.as_deref().map_or(true, str::is_empty)
            || self.title.is_none()
            || self.created_at.is_none()
            || self.last_modified.is_none()
            || self.word_count != Some(count_words(content))
    }

    /// Complete the entry, generating whatever is missing
    pub fn into_entry(self, now: DateTime<Utc>) -> Entry {
        let content = self.content.unwrap_or_default();
        let created_at = self.created_at.unwrap_or(now);
        Entry {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_id),
            title: self.title.unwrap_or_default(),
            word_count: count_words(&content),
            content,
            created_at,
            last_modified: self.last_modified.unwrap_or(created_at),
        }
    }
}

/// The unsaved, in-progress entry buffer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl Draft {
    /// Create a draft stamped with `at`
    pub fn new(title: impl Into<String>, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            timestamp: at.timestamp_millis(),
        }
    }

    /// Whether both fields are blank after trimming
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }

    /// Word count of the draft content, computed on demand
    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }

    /// When the draft was written, if the stored timestamp is valid
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Count whitespace-delimited non-empty tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Generate a fresh entry id
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("Feeling hopeful today"), 3);
        assert_eq!(count_words("  spaced   out\nlines\there "), 4);
    }

    #[test]
    fn test_entry_new_trims_and_counts() {
        let entry = Entry::new("  Day One ", "  Feeling hopeful today \n", at(100));
        assert_eq!(entry.title, "Day One");
        assert_eq!(entry.content, "Feeling hopeful today");
        assert_eq!(entry.word_count, 3);
        assert_eq!(entry.created_at, entry.last_modified);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = Entry::new("", "one", at(0));
        let b = Entry::new("", "one", at(0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_entry_rewrite_keeps_identity() {
        let mut entry = Entry::new("Old", "old words here", at(100));
        let id = entry.id.clone();

        entry.rewrite("New", "just two", at(200));

        assert_eq!(entry.id, id);
        assert_eq!(entry.created_at, at(100));
        assert_eq!(entry.last_modified, at(200));
        assert_eq!(entry.word_count, 2);
    }

    #[test]
    fn test_display_title() {
        let untitled = Entry::new("", "text", at(0));
        assert_eq!(untitled.display_title(), "Untitled Entry");

        let titled = Entry::new("Morning", "text", at(0));
        assert_eq!(titled.display_title(), "Morning");
    }

    #[test]
    fn test_entry_json_uses_camel_case() {
        let entry = Entry::new("T", "c", at(0));
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastModified").is_some());
        assert!(json.get("wordCount").is_some());
    }

    #[test]
    fn test_stored_entry_legacy_date_alias() {
        let stored: StoredEntry = serde_json::from_str(
            r#"{"title":"Old","content":"two words","date":"2024-01-05T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(stored.needs_backfill());

        let entry = stored.into_entry(at(999));
        assert_eq!(entry.created_at.to_rfc3339(), "2024-01-05T10:00:00+00:00");
        assert_eq!(entry.last_modified, entry.created_at);
        assert_eq!(entry.word_count, 2);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_stored_entry_complete_needs_no_backfill() {
        let entry = Entry::new("T", "three small words", at(50));
        let json = serde_json::to_string(&entry).unwrap();
        let stored: StoredEntry = serde_json::from_str(&json).unwrap();

        assert!(!stored.needs_backfill());
        assert_eq!(stored.into_entry(at(999)), entry);
    }

    #[test]
    fn test_stored_entry_wrong_word_count_is_recomputed() {
        let stored: StoredEntry = serde_json::from_str(
            r#"{"id":"abc","title":"","content":"a b c","createdAt":"2024-01-05T10:00:00Z","lastModified":"2024-01-05T10:00:00Z","wordCount":0}"#,
        )
        .unwrap();
        assert!(stored.needs_backfill());
        assert_eq!(stored.into_entry(at(0)).word_count, 3);
    }

    #[test]
    fn test_draft_blank_and_timestamp() {
        let draft = Draft::new("  ", "\n", at(10));
        assert!(draft.is_blank());
        assert_eq!(draft.timestamp, 10_000);
        assert_eq!(draft.saved_at(), Some(at(10)));

        let draft = Draft::new("", "some words", at(10));
        assert!(!draft.is_blank());
        assert_eq!(draft.word_count(), 2);
    }

    #[test]
    fn test_draft_missing_fields_default() {
        let draft: Draft = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(draft.title, "");
        assert_eq!(draft.content, "hi");
        assert_eq!(draft.timestamp, 0);
    }
}
