//! Journal CLI
//!
//! Command-line interface for journal - write, search and export entries.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use journal_core::{Config, Journal, SortKey};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Journal - a local personal journal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new entry
    #[command(alias = "add")]
    New {
        /// Entry title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Entry content (opens editor if not provided)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Compose an entry line by line with draft autosave
    Write {
        /// Entry title
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// List entries
    #[command(alias = "ls")]
    List {
        /// Only entries whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order: newest, oldest, title
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Search entries
    Search {
        /// Search text
        query: String,
        /// Sort order: newest, oldest, title
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Show an entry
    Show {
        /// Entry ID (full or prefix)
        id: String,
    },
    /// Edit an entry
    Edit {
        /// Entry ID (full or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID (full or prefix)
        id: String,
    },
    /// Export an entry as a text file
    Export {
        /// Entry ID (full or prefix)
        id: String,
        /// Directory to write into (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show entry, word and day totals
    Stats,
    /// Inspect or discard the saved draft
    Draft {
        #[command(subcommand)]
        command: Option<DraftCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum DraftCommands {
    /// Show the saved draft
    Show,
    /// Discard the saved draft
    Clear,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, autosave_delay_ms, default_sort, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config_path = cli.config.clone().unwrap_or_else(Config::config_file_path);
    let config = Config::load_from_path(&config_path).context("Failed to load configuration")?;
    init_logging(&config);

    if let Commands::Config { command } = cli.command {
        return handle_config_command(command, config, &config_path, &output);
    }

    let mut journal = Journal::open_with_config(&config);
    let default_sort = config.default_sort;

    match cli.command {
        Commands::New { title, content } => {
            commands::entry::create(&mut journal, title, content, &output)
        }
        Commands::Write { title } => commands::write::compose(&mut journal, title, &output).await,
        Commands::List { search, sort } => commands::entry::list(
            &journal,
            search,
            sort.unwrap_or(default_sort),
            &output,
        ),
        Commands::Search { query, sort } => commands::entry::list(
            &journal,
            Some(query),
            sort.unwrap_or(default_sort),
            &output,
        ),
        Commands::Show { id } => commands::entry::show(&journal, id, &output),
        Commands::Edit { id, title, content } => {
            commands::entry::edit(&mut journal, id, title, content, &output)
        }
        Commands::Delete { id } => commands::entry::delete(&mut journal, id, &output),
        Commands::Export { id, out } => commands::entry::export(&journal, id, out, &output),
        Commands::Stats => commands::stats::show(&journal, &output),
        Commands::Draft { command } => match command {
            Some(DraftCommands::Show) | None => commands::draft::show(&journal, &output),
            Some(DraftCommands::Clear) => commands::draft::clear(&journal, &output),
        },
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config: Config,
    config_path: &std::path::Path,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(&config, config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(config, config_path, key, value, output)
        }
    }
}

/// Initialize logging
///
/// Only initializes if JOURNAL_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log), or to
/// stderr when the file cannot be created.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("JOURNAL_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "journal_core={},journal_cli={}",
        log_level, log_level
    ));
    let log_path = config.log_path();

    // Ignore error if already initialized
    match File::create(&log_path) {
        Ok(log_file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();
            info!("Logging initialized to {:?}", log_path);
        }
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
