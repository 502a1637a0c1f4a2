//! Command dispatch and handlers.

pub mod alias;
pub mod batch;
pub mod resolve;
pub mod scan;

use std::env;
use std::path::Path;

use crate::adapters::live::LiveFileSystem;
use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::FinderConfig;
use crate::context::ServiceContext;

/// Worker threads of the command runtime.
const RUNTIME_WORKERS: usize = 4;

/// Dispatch a parsed command to its handler.
///
/// When `MODEL_FINDER_RECORD` is set to a directory path, all port
/// interactions are recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the config is malformed, the runtime cannot
/// start, or the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = FinderConfig::from_env(&LiveFileSystem, cli.config.as_deref())?;

    let (ctx, session) = if let Ok(dir) = env::var("MODEL_FINDER_RECORD") {
        let (ctx, session) = ServiceContext::recording_at(Path::new(&dir), &config.search)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config.search), None)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKERS)
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let result = runtime.block_on(dispatch_with_context(&cli.command, &ctx, &config));

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &FinderConfig,
) -> Result<(), String> {
    match command {
        Command::Scan { workflow, out, resolve } => {
            scan::run(ctx, config, workflow, out.as_deref(), *resolve).await
        }
        Command::Resolve { ledger } => resolve::run(ctx, config, ledger).await,
        Command::Batch { directory, patterns, resolve } => {
            batch::run(ctx, config, directory, patterns, *resolve).await
        }
        Command::Alias(command) => alias::run(ctx, config, command),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
