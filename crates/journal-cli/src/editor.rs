//! Interactive editing support
//!
//! Opens $EDITOR for writing entries and asks for confirmation before
//! destructive actions.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

/// Marker for instruction lines stripped from the edited text
const COMMENT_PREFIX: &str = "<!--";

/// Open an entry in the user's editor
///
/// The first line holds the title, the rest is the entry body.
/// Returns the edited `(title, content)`.
pub fn edit_entry(title: &str, content: &str) -> Result<(String, String)> {
    let initial = format!(
        "{} First line is the title. Everything after it is the entry. -->\n{}\n\n{}\n",
        COMMENT_PREFIX, title, content
    );
    let edited = edit_text(&initial).context("Failed to edit entry")?;
    Ok(parse_entry_text(&edited))
}

/// Split edited text into title and content, dropping instruction lines
pub fn parse_entry_text(text: &str) -> (String, String) {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_PREFIX));

    let title = lines.next().unwrap_or("").trim().to_string();
    let content = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    (title, content)
}

/// Open content in the user's preferred editor
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let temp_path = env::temp_dir().join(format!("journal_entry_{}.md", std::process::id()));

    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(&temp_path)
        .with_context(|| format!("Failed to read edited file: {:?}", temp_path))?;

    let _ = fs::remove_file(&temp_path);

    Ok(content)
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];
    if let Some(editor) = common_editors.iter().find(|e| command_exists(e)) {
        return Ok(editor.to_string());
    }

    bail!(
        "No editor found. Set $EDITOR environment variable, or pass --content.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
