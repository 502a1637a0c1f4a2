//! `model-finder batch` command.

use std::path::Path;

use super::resolve::resolve_ledger;
use crate::alias::AliasMap;
use crate::batch::BatchCoordinator;
use crate::config::FinderConfig;
use crate::context::ServiceContext;

/// Execute the `batch` command.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed, the summary outputs
/// cannot be written, or the optional resolution run fails.
pub async fn run(
    ctx: &ServiceContext,
    config: &FinderConfig,
    directory: &Path,
    patterns: &[String],
    resolve: bool,
) -> Result<(), String> {
    let aliases = AliasMap::load(&*ctx.fs, &config.paths.alias_file);
    let summary = BatchCoordinator::new(ctx, config, &aliases).run(directory, patterns).await?;

    println!(
        "{} candidate(s), {} valid, {} skipped",
        summary.candidates,
        summary.valid.len(),
        summary.skipped
    );
    for report in &summary.reports {
        match &report.ledger {
            Some(ledger) => println!(
                "  {}: {} missing -> {}",
                report.workflow.display(),
                report.missing_count,
                ledger.display()
            ),
            None => println!("  {}: {} missing", report.workflow.display(), report.missing_count),
        }
    }
    if let Some(report) = &summary.report_path {
        println!("Report: {}", report.display());
    }
    let Some(ledger) = &summary.summary_ledger else {
        println!("No missing models found");
        return Ok(());
    };
    println!("Summary ledger: {} ({} references)", ledger.display(), summary.total_missing());

    if resolve {
        resolve_ledger(ctx, config, &aliases, ledger).await?;
    }
    Ok(())
}
