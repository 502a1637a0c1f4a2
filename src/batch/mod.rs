//! Batch processing of a directory of workflows.
//!
//! A batch run has three phases:
//!
//! 1. **Discovery**: glob patterns over the directory's entries.
//! 2. **Validation**: every candidate is read and parsed on a bounded pool
//!    with a per-file timeout. Failures are counted, never raised.
//! 3. **Processing**: valid workflows are scanned in name order. Each one
//!    with missing files gets its own ledger, and all missing references
//!    also feed one summary ledger for the run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::alias::AliasMap;
use crate::config::FinderConfig;
use crate::context::ServiceContext;
use crate::ledger::paths::{batch_dir, ledger_path, REPORT_FILE, SUMMARY_FILE};
use crate::ledger::LedgerStore;
use crate::ports::FileSystem;
use crate::scan::{parse_descriptor, scan_workflow, AssetReference};

/// Pattern used when none is given.
pub const DEFAULT_PATTERN: &str = "*.json";

/// Outcome for one processed workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    /// Workflow file.
    pub workflow: PathBuf,
    /// Its ledger, if it had missing files and the ledger was written.
    pub ledger: Option<PathBuf>,
    /// Number of missing references.
    pub missing_count: usize,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Files matched by the patterns.
    pub candidates: usize,
    /// Files that parsed as workflows, sorted.
    pub valid: Vec<PathBuf>,
    /// Candidates that failed validation or timed out.
    pub skipped: usize,
    /// One entry per valid workflow, in processing order.
    pub reports: Vec<WorkflowReport>,
    /// Summary ledger, written when any workflow had missing files.
    pub summary_ledger: Option<PathBuf>,
    /// Run report table.
    pub report_path: Option<PathBuf>,
}

impl BatchSummary {
    /// Missing references across all workflows.
    #[must_use]
    pub fn total_missing(&self) -> usize {
        self.reports.iter().map(|r| r.missing_count).sum()
    }
}

/// Splits `;`-separated pattern lists into single patterns.
fn split_patterns(patterns: &[String]) -> Vec<String> {
    let split: Vec<String> = patterns
        .iter()
        .flat_map(|p| p.split(';'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if split.is_empty() {
        vec![DEFAULT_PATTERN.to_string()]
    } else {
        split
    }
}

/// Compiles a `*`/`?` wildcard pattern into an anchored regex.
fn glob_regex(pattern: &str) -> Result<Regex, String> {
    let mut source = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str("[^/]*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| format!("Invalid pattern '{pattern}': {e}"))
}

/// Entries of `directory` matching any pattern, deduplicated and sorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a pattern is
/// invalid.
pub fn discover(
    fs: &dyn FileSystem,
    directory: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, String> {
    let matchers = split_patterns(patterns)
        .iter()
        .map(|p| glob_regex(p))
        .collect::<Result<Vec<_>, _>>()?;
    let entries = fs
        .list_dir(directory)
        .map_err(|e| format!("Failed to list {}: {e}", directory.display()))?;
    let found: BTreeSet<PathBuf> = entries
        .iter()
        .filter(|name| matchers.iter().any(|m| m.is_match(name)))
        .map(|name| directory.join(name))
        .collect();
    Ok(found.into_iter().collect())
}

fn validate_file(fs: &dyn FileSystem, path: &Path) -> Result<(), String> {
    let text = fs.read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    parse_descriptor(&text).map(|_| ())
}

/// Parses every candidate on a bounded pool; returns the valid ones sorted
/// and the number skipped.
pub async fn validate_all(
    fs: &Arc<dyn FileSystem>,
    candidates: Vec<PathBuf>,
    max_workers: usize,
    timeout: Duration,
) -> (Vec<PathBuf>, usize) {
    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();
    for path in candidates {
        let fs = Arc::clone(fs);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let permit = permits.acquire_owned().await;
            let target = path.clone();
            // The permit lives as long as the read, even one that outlasts its timeout.
            let check = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                validate_file(&*fs, &target)
            });
            let outcome = match tokio::time::timeout(timeout, check).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(format!("validation task failed: {e}")),
                Err(_) => Err(format!("timed out after {} ms", timeout.as_millis())),
            };
            (path, outcome)
        });
    }

    let mut valid = Vec::new();
    let mut skipped = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, Ok(()))) => valid.push(path),
            Ok((path, Err(reason))) => {
                tracing::warn!(path = %path.display(), %reason, "skipping invalid workflow");
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "validation task aborted");
                skipped += 1;
            }
        }
    }
    valid.sort();
    (valid, skipped)
}

/// Runs discovery, validation and processing over a directory.
pub struct BatchCoordinator<'a> {
    ctx: &'a ServiceContext,
    config: &'a FinderConfig,
    aliases: &'a AliasMap,
}

impl<'a> BatchCoordinator<'a> {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a FinderConfig, aliases: &'a AliasMap) -> Self {
        Self { ctx, config, aliases }
    }

    /// Processes every workflow in `directory` matching `patterns`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed, a pattern is
    /// invalid, or the summary ledger or run report cannot be written.
    /// Failures of single workflows are logged and do not abort the run.
    pub async fn run(&self, directory: &Path, patterns: &[String]) -> Result<BatchSummary, String> {
        let candidates = discover(&*self.ctx.fs, directory, patterns)?;
        tracing::info!(directory = %directory.display(), candidates = candidates.len(), "discovered workflows");
        let mut summary = BatchSummary { candidates: candidates.len(), ..BatchSummary::default() };

        let (valid, skipped) = validate_all(
            &self.ctx.fs,
            candidates,
            self.config.batch.max_workers,
            self.config.batch.validation_timeout(),
        )
        .await;
        tracing::info!(valid = valid.len(), skipped, "validated workflows");
        summary.skipped = skipped;

        let store = LedgerStore::new(&*self.ctx.fs, &self.config.search);
        let out_dir = batch_dir(&self.config.paths.output_root, &*self.ctx.clock);
        let mut all_missing: Vec<AssetReference> = Vec::new();

        for path in &valid {
            let missing = scan_workflow(&*self.ctx.fs, &self.config.scan, self.aliases, path);
            let ledger = if missing.is_empty() {
                None
            } else {
                let target = ledger_path(&self.config.paths.output_root, &*self.ctx.clock, path);
                match store.create_or_append(&target, &missing) {
                    Ok(handle) => Some(handle.path),
                    Err(e) => {
                        tracing::error!(workflow = %path.display(), error = %e, "failed to write ledger");
                        None
                    }
                }
            };
            summary.reports.push(WorkflowReport {
                workflow: path.clone(),
                ledger,
                missing_count: missing.len(),
            });
            all_missing.extend(missing);
        }
        summary.valid = valid;

        if !all_missing.is_empty() {
            let handle = store.create_or_append(&out_dir.join(SUMMARY_FILE), &all_missing)?;
            summary.summary_ledger = Some(handle.path);
        }
        if !summary.reports.is_empty() {
            let report = out_dir.join(REPORT_FILE);
            self.write_report(&report, &summary.reports)?;
            summary.report_path = Some(report);
        }
        tracing::info!(
            processed = summary.reports.len(),
            missing = summary.total_missing(),
            "batch finished"
        );
        Ok(summary)
    }

    fn write_report(&self, path: &Path, reports: &[WorkflowReport]) -> Result<(), String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let encode = |e: csv::Error| format!("Failed to encode batch report: {e}");
        writer.write_record(["workflow", "ledger", "missing_count"]).map_err(encode)?;
        for report in reports {
            let ledger = report.ledger.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
            writer
                .write_record([
                    report.workflow.display().to_string(),
                    ledger,
                    report.missing_count.to_string(),
                ])
                .map_err(encode)?;
        }
        let bytes = writer.into_inner().map_err(|e| format!("Failed to encode batch report: {e}"))?;
        let text = String::from_utf8(bytes).map_err(|e| format!("Batch report is not UTF-8: {e}"))?;
        self.ctx
            .fs
            .write(path, &text)
            .map_err(|e| format!("Failed to write batch report {}: {e}", path.display()))
    }
}
