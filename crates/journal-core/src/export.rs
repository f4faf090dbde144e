//! Plain-text export and display formatting
//!
//! An exported entry is a detached text copy:
//!
//! ```text
//! <title or "Untitled Entry">
//! <formatted date>
//!
//! <content>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};

use crate::models::Entry;

/// A rendered export ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedEntry {
    /// Suggested file name, `journal-entry-<YYYY-MM-DD>.txt`
    pub filename: String,
    /// File contents
    pub contents: String,
}

impl ExportedEntry {
    /// Write the export into `dir`, returning the full path
    ///
    /// Does not overwrite: a numeric suffix is added when the name is taken.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

        let path = unique_path(dir, &self.filename);
        fs::write(&path, &self.contents)
            .with_context(|| format!("Failed to write export file: {:?}", path))?;
        Ok(path)
    }
}

/// Render an entry for export, dating it relative to `now` in local time
pub fn export(entry: &Entry, now: DateTime<Utc>) -> ExportedEntry {
    export_in(entry, now, &Local)
}

/// Render an entry for export using the given timezone
pub fn export_in<Tz: TimeZone>(entry: &Entry, now: DateTime<Utc>, tz: &Tz) -> ExportedEntry
where
    Tz::Offset: std::fmt::Display,
{
    let contents = format!(
        "{}\n{}\n\n{}",
        entry.display_title(),
        format_relative_in(entry.created_at, now, tz),
        entry.content
    );

    ExportedEntry {
        filename: export_filename(entry),
        contents,
    }
}

/// `journal-entry-<ISO date>.txt`, dated in UTC
pub fn export_filename(entry: &Entry) -> String {
    format!("journal-entry-{}.txt", entry.created_at.format("%Y-%m-%d"))
}

/// Human-friendly date relative to `now`, in local time
pub fn format_relative(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_relative_in(date, now, &Local)
}

/// Human-friendly date relative to `now`
///
/// Days are counted as whole 24-hour periods elapsed, not calendar days.
pub fn format_relative_in<Tz: TimeZone>(date: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = date.with_timezone(tz);
    // Future timestamps (clock skew) count as today
    let days = (now - date).num_days().max(0);

    match days {
        0 => format!("Today at {}", local.format("%H:%M")),
        1 => format!("Yesterday at {}", local.format("%H:%M")),
        2..=6 => format!("{} days ago", days),
        _ => local.format("%b %-d, %Y").to_string(),
    }
}

/// "1 word" / "N words"
pub fn word_label(count: usize) -> String {
    plural(count, "word")
}

/// "1 character" / "N characters"
pub fn char_label(count: usize) -> String {
    plural(count, "character")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, "txt"));
    (1..)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_relative() {
        let now = utc("2024-06-10T18:00:00Z");

        assert_eq!(
            format_relative_in(utc("2024-06-10T09:05:00Z"), now, &Utc),
            "Today at 09:05"
        );
        assert_eq!(
            format_relative_in(now - Duration::hours(30), now, &Utc),
            "Yesterday at 12:00"
        );
        assert_eq!(
            format_relative_in(now - Duration::days(3), now, &Utc),
            "3 days ago"
        );
        assert_eq!(
            format_relative_in(utc("2024-01-05T10:00:00Z"), now, &Utc),
            "Jan 5, 2024"
        );
        assert_eq!(
            format_relative_in(now + Duration::hours(2), now, &Utc),
            "Today at 20:00"
        );
    }

    #[test]
    fn test_export_format() {
        let created = utc("2024-01-05T10:00:00Z");
        let entry = Entry::new("Day One", "Feeling hopeful today", created);

        let exported = export_in(&entry, utc("2024-06-10T18:00:00Z"), &Utc);

        assert_eq!(exported.filename, "journal-entry-2024-01-05.txt");
        assert_eq!(
            exported.contents,
            "Day One\nJan 5, 2024\n\nFeeling hopeful today"
        );
    }

    #[test]
    fn test_export_untitled() {
        let created = utc("2024-01-05T10:00:00Z");
        let entry = Entry::new("", "no title", created);

        let exported = export_in(&entry, created, &Utc);
        assert!(exported.contents.starts_with("Untitled Entry\nToday at 10:00\n\n"));
    }

    #[test]
    fn test_write_to_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let entry = Entry::new("", "text", utc("2024-01-05T10:00:00Z"));
        let exported = export_in(&entry, Utc::now(), &Utc);

        let first = exported.write_to(temp_dir.path()).unwrap();
        let second = exported.write_to(temp_dir.path()).unwrap();

        assert!(first.ends_with("journal-entry-2024-01-05.txt"));
        assert!(second.ends_with("journal-entry-2024-01-05-1.txt"));
        assert_eq!(fs::read_to_string(second).unwrap(), exported.contents);
    }

    #[test]
    fn test_labels() {
        assert_eq!(word_label(0), "0 words");
        assert_eq!(word_label(1), "1 word");
        assert_eq!(char_label(1), "1 character");
        assert_eq!(char_label(1200), "1200 characters");
    }
}
