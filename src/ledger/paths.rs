//! Output locations for ledgers and run reports.

use std::path::{Path, PathBuf};

use crate::ports::Clock;

/// Ledger collecting every missing file of a batch.
pub const SUMMARY_FILE: &str = "missing_summary.csv";

/// Per-workflow outcome table of a batch.
pub const REPORT_FILE: &str = "batch_report.csv";

/// Subfolder of the dated folder holding batch-wide artifacts. Per-workflow
/// ledgers sit beside it, so no workflow name can collide with them.
pub const BATCH_DIR: &str = "_batch";

/// Today's output folder: `<root>/<YYYY-MM-DD>`.
#[must_use]
pub fn dated_dir(root: &Path, clock: &dyn Clock) -> PathBuf {
    root.join(clock.now().format("%Y-%m-%d").to_string())
}

/// Folder for a batch's summary ledger and run report: `<root>/<YYYY-MM-DD>/_batch`.
#[must_use]
pub fn batch_dir(root: &Path, clock: &dyn Clock) -> PathBuf {
    dated_dir(root, clock).join(BATCH_DIR)
}

/// Ledger path for a workflow: `<root>/<YYYY-MM-DD>/<stem>.csv`.
#[must_use]
pub fn ledger_path(root: &Path, clock: &dyn Clock, workflow: &Path) -> PathBuf {
    let stem = workflow.file_stem().map_or_else(
        || "workflow".to_string(),
        |s| s.to_string_lossy().into_owned(),
    );
    dated_dir(root, clock).join(format!("{stem}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedClock;

    #[test]
    fn ledger_lands_in_dated_folder_named_after_workflow() {
        let path = ledger_path(Path::new("results"), &FixedClock, Path::new("/wf/portrait.json"));
        assert_eq!(path, PathBuf::from("results/2024-06-15/portrait.csv"));
        assert_eq!(
            batch_dir(Path::new("results"), &FixedClock).join(SUMMARY_FILE),
            PathBuf::from("results/2024-06-15/_batch/missing_summary.csv")
        );
    }

    #[test]
    fn workflows_named_like_batch_artifacts_keep_their_own_ledger() {
        let root = Path::new("results");
        let batch = batch_dir(root, &FixedClock);
        for (workflow, artifact) in
            [("/wf/missing_summary.json", SUMMARY_FILE), ("/wf/batch_report.json", REPORT_FILE)]
        {
            let ledger = ledger_path(root, &FixedClock, Path::new(workflow));
            assert_ne!(ledger, batch.join(artifact));
            assert!(!ledger.starts_with(&batch));
        }
    }
}
