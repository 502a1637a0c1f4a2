//! Core library entry for the `model-finder` CLI.
//!
//! Scans workflow graph descriptors for model files that are not present
//! on disk, records them in CSV ledgers, and searches model hosting sites
//! for download links.

pub mod adapters;
pub mod alias;
pub mod batch;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod ledger;
pub mod logging;
pub mod ports;
pub mod resolve;
pub mod scan;

#[cfg(test)]
pub(crate) mod testing;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().map_err(|e| e.to_string())?;
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.verbose);
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_prints_help_without_error() {
        assert!(run(["model-finder", "--help"]).is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["model-finder", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_workflow() {
        let err = run(["model-finder", "scan", "/nonexistent/model-finder/workflow.json"]).unwrap_err();
        assert!(err.contains("Workflow not found"));
    }
}
