//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI parser for `model-finder`.
#[derive(Debug, Parser)]
#[command(
    name = "model-finder",
    version,
    about = "Find model files missing from workflow graphs and look up download links"
)]
pub struct Cli {
    /// Increase log detail (-v debug, -vv trace). `RUST_LOG` applies otherwise.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to `$MODEL_FINDER_CONFIG` or `model_finder.yaml`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan one workflow and write a ledger of its missing models.
    Scan {
        /// Workflow JSON file.
        workflow: PathBuf,
        /// Output root for the dated ledger folder.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Resolve the ledger right after writing it.
        #[arg(long)]
        resolve: bool,
    },
    /// Search for links for every unresolved row of a ledger.
    Resolve {
        /// Ledger CSV file.
        ledger: PathBuf,
    },
    /// Scan every matching workflow in a directory.
    Batch {
        /// Directory holding workflow files.
        directory: PathBuf,
        /// Filename pattern with `*` and `?`; repeat or separate with `;`.
        #[arg(long = "pattern", short = 'p', value_name = "PATTERN")]
        patterns: Vec<String>,
        /// Resolve the summary ledger after the batch.
        #[arg(long)]
        resolve: bool,
    },
    /// Manage irregular-name corrections.
    #[command(subcommand)]
    Alias(AliasCommand),
}

/// `alias` subcommands.
#[derive(Debug, Subcommand)]
pub enum AliasCommand {
    /// Print every correction.
    List,
    /// Add a correction.
    Add {
        /// Name as it appears in workflows.
        original: String,
        /// Name to search for instead.
        corrected: String,
        /// Free-form note.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Replace the names and notes of a correction.
    Update {
        /// Id shown by `alias list`.
        id: String,
        /// New name as it appears in workflows.
        original: String,
        /// New name to search for instead.
        corrected: String,
        /// Free-form note; replaces the old one.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove a correction by id.
    Remove {
        /// Id shown by `alias list`.
        id: String,
    },
}
