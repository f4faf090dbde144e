//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::Utc;
use serde::Serialize;

use journal_core::export::{char_label, format_relative, word_label};
use journal_core::{Draft, Entry, Outcome, Persistence, Stats};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single entry in full
    pub fn print_entry(&self, entry: &Entry) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", entry.id);
                println!("Title:    {}", entry.display_title());
                println!(
                    "Created:  {} ({})",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    format_relative(entry.created_at, Utc::now())
                );
                if entry.last_modified != entry.created_at {
                    println!("Modified: {}", entry.last_modified.format("%Y-%m-%d %H:%M"));
                }
                println!("Length:   {}", word_label(entry.word_count));
                println!();
                println!("{}", entry.content);
            }
            OutputFormat::Json => print_json(entry),
            OutputFormat::Quiet => println!("{}", entry.id),
        }
    }

    /// Print a list of entries, one line each
    pub fn print_entries(&self, entries: &[&Entry], searching: bool) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    if searching {
                        println!("No entries match your search.");
                    } else {
                        println!("No entries yet. Write your first one with `journal new`.");
                    }
                    return;
                }
                let now = Utc::now();
                for entry in entries {
                    println!(
                        "{} | {} | {} | {}",
                        short_id(&entry.id),
                        pad(&truncate(entry.display_title(), 30), 30),
                        pad(&format_relative(entry.created_at, now), 20),
                        word_label(entry.word_count)
                    );
                    println!("         {}", truncate_line(&entry.content, 70));
                }
                println!("\n{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
            }
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print journal totals
    pub fn print_stats(&self, stats: &Stats) {
        match self.format {
            OutputFormat::Human => {
                println!("Entries:          {}", stats.entries);
                println!("Total words:      {}", stats.total_words);
                println!("Days journaling:  {}", stats.journaling_days);
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!(
                    "{} {} {}",
                    stats.entries, stats.total_words, stats.journaling_days
                );
            }
        }
    }

    /// Print the stored draft, if any
    pub fn print_draft(&self, draft: Option<&Draft>) {
        match self.format {
            OutputFormat::Human => match draft {
                Some(draft) => {
                    if let Some(saved_at) = draft.saved_at() {
                        println!("Draft saved {}", format_relative(saved_at, Utc::now()));
                    }
                    if !draft.title.is_empty() {
                        println!("Title: {}", draft.title);
                    }
                    println!(
                        "Length: {}, {}",
                        word_label(draft.word_count()),
                        char_label(draft.content.chars().count())
                    );
                    println!();
                    println!("{}", draft.content);
                }
                None => println!("No draft saved."),
            },
            OutputFormat::Json => print_json(&draft),
            OutputFormat::Quiet => {
                if let Some(draft) = draft {
                    println!("{}", draft.content);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Warn when a change could not be written to disk
    pub fn report_persistence<T>(&self, outcome: &Outcome<T>) {
        self.report_storage(&outcome.persistence);
    }

    pub fn report_storage(&self, persistence: &Persistence) {
        if let Persistence::Degraded(e) = persistence {
            if self.format != OutputFormat::Quiet {
                eprintln!("⚠ Change kept for this session only: {}", e);
                if let Some(hint) = e.recovery_suggestion() {
                    eprintln!("  {}", hint);
                }
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// First eight characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}
