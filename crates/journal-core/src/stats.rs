//! Journal statistics

use std::collections::HashSet;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::models::Entry;

/// Totals shown alongside the entry list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of entries
    pub entries: usize,
    /// Sum of all entry word counts
    pub total_words: usize,
    /// Distinct calendar days with at least one entry
    pub journaling_days: usize,
}

impl Stats {
    /// Compute stats using the local timezone for calendar days
    pub fn compute(entries: &[Entry]) -> Self {
        Self::compute_in(entries, &Local)
    }

    /// Compute stats, bucketing creation times into days of `tz`
    pub fn compute_in<Tz: TimeZone>(entries: &[Entry], tz: &Tz) -> Self {
        let days: HashSet<_> = entries
            .iter()
            .map(|entry| entry.created_at.with_timezone(tz).date_naive())
            .collect();

        Self {
            entries: entries.len(),
            total_words: entries.iter().map(|entry| entry.word_count).sum(),
            journaling_days: days.len(),
        }
    }
}
