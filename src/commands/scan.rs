//! `model-finder scan` command.

use std::path::Path;

use super::resolve::resolve_ledger;
use crate::alias::AliasMap;
use crate::config::FinderConfig;
use crate::context::ServiceContext;
use crate::ledger::paths::ledger_path;
use crate::ledger::LedgerStore;
use crate::scan::scan_workflow;

/// Execute the `scan` command.
///
/// # Errors
///
/// Returns an error if the workflow does not exist, the ledger cannot be
/// written, or the optional resolution run fails.
pub async fn run(
    ctx: &ServiceContext,
    config: &FinderConfig,
    workflow: &Path,
    out: Option<&Path>,
    resolve: bool,
) -> Result<(), String> {
    if !ctx.fs.exists(workflow) {
        return Err(format!("Workflow not found: {}", workflow.display()));
    }
    let aliases = AliasMap::load(&*ctx.fs, &config.paths.alias_file);
    let missing = scan_workflow(&*ctx.fs, &config.scan, &aliases, workflow);
    if missing.is_empty() {
        println!("No missing models in {}", workflow.display());
        return Ok(());
    }

    let root = out.unwrap_or(config.paths.output_root.as_path());
    let target = ledger_path(root, &*ctx.clock, workflow);
    let handle = LedgerStore::new(&*ctx.fs, &config.search).create_or_append(&target, &missing)?;

    println!("{} missing model reference(s) in {}", missing.len(), workflow.display());
    for row in &handle.rows {
        println!("{:>4}  {}  [{}]", row.seq, row.filename, row.node_types);
    }
    println!("Ledger: {}", handle.path.display());

    if resolve {
        resolve_ledger(ctx, config, &aliases, &handle.path).await?;
    }
    Ok(())
}
