//! Search and sort over entries
//!
//! Both operations are stateless and borrow the entries they are given. The
//! input is never reordered; each call produces a new sequence of references.
//! Callers search first, then sort the result.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::Entry;

/// Title used for ordering entries that have none
const UNTITLED_SORT_KEY: &str = "Untitled";

/// Display order for the entry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    /// Least recently created first
    Oldest,
    /// Alphabetical by title
    Title,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Title => "title",
        }
    }

    /// Parse a sort key, falling back to `Newest` for anything unrecognized
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "title" => Ok(SortKey::Title),
            other => Err(format!(
                "Unknown sort key '{}'. Use newest, oldest, or title.",
                other
            )),
        }
    }
}

/// Case-insensitive substring match against title or content
///
/// A blank query returns every entry in input order.
pub fn search<'a, I>(entries: I, query: &str) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    if query.trim().is_empty() {
        return entries.into_iter().collect();
    }

    let needle = query.to_lowercase();
    entries
        .into_iter()
        .filter(|entry| {
            entry.title.to_lowercase().contains(&needle)
                || entry.content.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Order entries by `key`. The sort is stable.
pub fn sort<'a, I>(entries: I, key: SortKey) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut sorted: Vec<&Entry> = entries.into_iter().collect();
    match key {
        SortKey::Newest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Title => sorted.sort_by(|a, b| compare_titles(title_key(a), title_key(b))),
    }
    sorted
}

fn title_key(entry: &Entry) -> &str {
    if entry.title.is_empty() {
        UNTITLED_SORT_KEY
    } else {
        &entry.title
    }
}

/// Collation approximation in three levels: base letters, then accents, then
/// case with lowercase first
fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

/// Lowercased letters with diacritics removed
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Lowercased letters in decomposed form, accents kept
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// A search-then-sort view over the entry list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub sort: SortKey,
}

impl Query {
    pub fn new(text: impl Into<String>, sort: SortKey) -> Self {
        Self {
            text: text.into(),
            sort,
        }
    }

    /// Apply the search filter, then order the matches
    pub fn apply<'a, I>(&self, entries: I) -> Vec<&'a Entry>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        sort(search(entries, &self.text), self.sort)
    }
}
