//! Stats command handler

use anyhow::Result;

use journal_core::Journal;

use crate::output::Output;

/// Show entry, word and day totals
pub fn show(journal: &Journal, output: &Output) -> Result<()> {
    output.print_stats(&journal.store().stats());
    Ok(())
}
