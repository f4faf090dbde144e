//! Entry command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use journal_core::{Journal, JournalError, Query, SortKey};

use crate::editor::{confirm, edit_entry};
use crate::output::{short_id, Output};

/// Create a new entry
///
/// Opens the editor when no content is given, pre-filled from the saved draft.
pub fn create(
    journal: &mut Journal,
    title: Option<String>,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let (title, content) = match content {
        Some(content) => (title.unwrap_or_default(), content),
        None => {
            let draft = journal.restore_draft();
            if draft.is_some() {
                output.message("Restoring your saved draft.");
            }
            let draft_title = draft.as_ref().map(|d| d.title.as_str()).unwrap_or("");
            let draft_content = draft.as_ref().map(|d| d.content.as_str()).unwrap_or("");
            let title = title.as_deref().unwrap_or(draft_title);
            edit_entry(title, draft_content)?
        }
    };

    match journal.save_entry(&title, &content) {
        Ok(outcome) => {
            output.report_persistence(&outcome);
            let entry = outcome.into_value();
            output.success(&format!("Saved entry {}", short_id(&entry.id)));
            output.print_entry(&entry);
            Ok(())
        }
        Err(JournalError::EmptyContent) => {
            if !title.trim().is_empty() {
                output.report_storage(&journal.save_draft(&title, &content));
                output.message("Your title was kept as a draft.");
            }
            bail!("Please write something before saving.")
        }
        Err(e) => Err(e.into()),
    }
}

/// List entries, optionally filtered and sorted
pub fn list(
    journal: &Journal,
    search: Option<String>,
    sort: SortKey,
    output: &Output,
) -> Result<()> {
    let query = Query::new(search.unwrap_or_default(), sort);
    let entries = journal.store().query(&query);
    output.print_entries(&entries, !query.text.trim().is_empty());
    Ok(())
}

/// Show a single entry
pub fn show(journal: &Journal, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(journal, &id)?;
    let entry = journal
        .store()
        .get(&id)
        .ok_or_else(|| JournalError::NotFound(id.clone()))?;

    output.print_entry(entry);
    Ok(())
}

/// Edit an entry's title and content
pub fn edit(
    journal: &mut Journal,
    id: String,
    title: Option<String>,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(journal, &id)?;
    let current = journal
        .store()
        .get(&id)
        .cloned()
        .ok_or_else(|| JournalError::NotFound(id.clone()))?;

    let (title, content) = if title.is_none() && content.is_none() {
        edit_entry(&current.title, &current.content)?
    } else {
        (
            title.unwrap_or(current.title.clone()),
            content.unwrap_or(current.content.clone()),
        )
    };

    if title == current.title && content == current.content {
        output.message("No changes made.");
        return Ok(());
    }

    let outcome = journal
        .store_mut()
        .update(&id, &title, &content)
        .context("Failed to update entry")?;
    output.report_persistence(&outcome);
    output.success(&format!("Updated entry {}", short_id(&id)));

    Ok(())
}

/// Delete an entry
pub fn delete(journal: &mut Journal, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(journal, &id)?;

    if output.should_prompt() {
        if let Some(entry) = journal.store().get(&id) {
            println!(
                "Delete entry: {} - {}",
                short_id(&entry.id),
                entry.display_title()
            );
            if !confirm("This cannot be undone. Are you sure?")? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    let outcome = journal.store_mut().delete(&id);
    output.report_persistence(&outcome);
    output.success(&format!("Deleted entry: {}", short_id(&id)));

    Ok(())
}

/// Export an entry to a text file
pub fn export(
    journal: &Journal,
    id: String,
    dir: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(journal, &id)?;
    let exported = journal.export(&id)?;

    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let path = exported.write_to(&dir)?;

    output.success(&format!("Exported to {}", path.display()));
    Ok(())
}

/// Resolve an entry id (supports full id or unique prefix)
fn resolve_id(journal: &Journal, id: &str) -> Result<String> {
    let store = journal.store();

    if store.get(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = store
        .entries()
        .iter()
        .filter(|entry| entry.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No entry found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple entries match '{}':", id);
            for entry in &matches {
                eprintln!("  {} - {}", entry.id, entry.display_title());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
