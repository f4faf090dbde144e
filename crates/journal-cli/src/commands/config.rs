//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use journal_core::{Config, SortKey};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config: &Config, config_path: &Path, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "autosave_delay_ms": config.autosave_delay_ms,
                    "default_sort": config.default_sort,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:          {}", config.data_dir.display());
            println!("  autosave_delay_ms: {}", config.autosave_delay_ms);
            println!("  default_sort:      {}", config.default_sort);
            println!(
                "  log_file:          {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", config_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    mut config: Config,
    config_path: &Path,
    key: String,
    value: String,
    output: &Output,
) -> Result<()> {
    match key.as_str() {
        "data_dir" => {
            config.data_dir = PathBuf::from(&value);
        }
        "autosave_delay_ms" => {
            config.autosave_delay_ms = value
                .parse()
                .context("Invalid value for autosave_delay_ms. Use a number of milliseconds.")?;
        }
        "default_sort" => {
            config.default_sort = value.parse::<SortKey>().map_err(anyhow::Error::msg)?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(PathBuf::from(&value))
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, autosave_delay_ms, default_sort, log_file",
                key
            );
        }
    }

    config
        .save_to_path(config_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
