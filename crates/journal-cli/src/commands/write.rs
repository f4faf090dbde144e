//! Line-by-line composer with draft autosave
//!
//! Reads the entry body from stdin. Every line re-arms the autosave timer, so
//! a pause in typing writes the draft. End of input saves the entry.

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use journal_core::{AutosaveCommand, AutosaveEvent, Journal, JournalError};

use crate::output::{short_id, Output, OutputFormat};

/// Compose an entry interactively
pub async fn compose(journal: &mut Journal, title: Option<String>, output: &Output) -> Result<()> {
    compose_from(journal, title, BufReader::new(tokio::io::stdin()), output).await
}

/// Compose an entry from the lines of `input`
async fn compose_from<R>(
    journal: &mut Journal,
    title: Option<String>,
    input: R,
    output: &Output,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let draft = journal.restore_draft();
    let title = title
        .or_else(|| draft.as_ref().map(|d| d.title.clone()))
        .unwrap_or_default();
    let mut content = draft.map(|d| d.content).unwrap_or_default();

    if output.format == OutputFormat::Human {
        if !title.is_empty() {
            println!("Title: {}", title);
        }
        println!("Write your entry. Press Ctrl-D on an empty line to save.");
        if !content.is_empty() {
            println!("── restored draft ──");
            println!("{}", content);
        }
    }

    let mut handle = journal.spawn_autosave();
    let mut lines = input.lines();

    let read_error = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(&line);
                    let keystroke = AutosaveCommand::keystroke(title.as_str(), content.as_str());
                    if handle.command_tx.send(keystroke).await.is_err() {
                        tracing::warn!("Autosave task is gone; continuing without drafts");
                    }
                }
                Ok(None) => break None,
                Err(e) => break Some(e),
            },
            Some(event) = handle.event_rx.recv() => report_event(&event, output),
        }
    };

    // Writes whatever is still pending so nothing is lost if saving fails
    handle.shutdown().await;

    if let Some(e) = read_error {
        return Err(e).context("Failed to read input");
    }

    match journal.save_entry(&title, &content) {
        Ok(outcome) => {
            output.report_persistence(&outcome);
            let entry = outcome.into_value();
            output.success(&format!(
                "Saved entry {} ({} words)",
                short_id(&entry.id),
                entry.word_count
            ));
            Ok(())
        }
        Err(JournalError::EmptyContent) => {
            bail!("Nothing written; entry not saved.")
        }
        Err(e) => Err(e.into()),
    }
}

fn report_event(event: &AutosaveEvent, output: &Output) {
    if output.format != OutputFormat::Human {
        return;
    }
    match event {
        AutosaveEvent::Saved(_) => eprintln!("· draft saved"),
        AutosaveEvent::Cleared => {}
        AutosaveEvent::Failed(e) => eprintln!("⚠ Draft not saved: {}", e),
    }
}
