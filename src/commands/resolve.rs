//! `model-finder resolve` command.

use std::path::Path;

use crate::alias::AliasMap;
use crate::config::FinderConfig;
use crate::context::ServiceContext;
use crate::resolve::{ResolutionEngine, ResolutionSummary};

/// One-line account of a resolution run.
#[must_use]
pub fn summary_line(summary: &ResolutionSummary) -> String {
    format!(
        "Searched {}: {} resolved, {} redirect only, {} not found, {} errors ({} already resolved)",
        summary.attempted,
        summary.resolved,
        summary.redirect_only,
        summary.not_found,
        summary.errors,
        summary.skipped
    )
}

/// Resolves `ledger` with an already loaded alias map and prints the result.
///
/// # Errors
///
/// Returns an error if the resolution run fails as a whole.
pub async fn resolve_ledger(
    ctx: &ServiceContext,
    config: &FinderConfig,
    aliases: &AliasMap,
    ledger: &Path,
) -> Result<ResolutionSummary, String> {
    let summary = ResolutionEngine::new(ctx, config, aliases).run(ledger).await?;
    println!("{}", summary_line(&summary));
    println!("Ledger: {}", ledger.display());
    Ok(summary)
}

/// Execute the `resolve` command.
///
/// # Errors
///
/// Returns an error if the ledger cannot be read or written or the search
/// provider is unavailable.
pub async fn run(ctx: &ServiceContext, config: &FinderConfig, ledger: &Path) -> Result<(), String> {
    let aliases = AliasMap::load(&*ctx.fs, &config.paths.alias_file);
    resolve_ledger(ctx, config, &aliases, ledger).await.map(|_| ())
}
