//! Draft command handlers

use anyhow::Result;

use journal_core::Journal;

use crate::output::Output;

/// Show the saved draft
pub fn show(journal: &Journal, output: &Output) -> Result<()> {
    let draft = journal.restore_draft();
    output.print_draft(draft.as_ref());
    Ok(())
}

/// Discard the saved draft
pub fn clear(journal: &Journal, output: &Output) -> Result<()> {
    let persistence = journal.discard_draft();
    output.report_storage(&persistence);
    if persistence.is_saved() {
        output.success("Draft cleared");
    }
    Ok(())
}
