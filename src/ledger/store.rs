//! Ledger persistence over the `FileSystem` port.

use std::path::{Path, PathBuf};

use super::{merge_references, LedgerRow, HEADER};
use crate::config::SearchSettings;
use crate::ports::FileSystem;
use crate::resolve::strategy::SearchPlan;
use crate::scan::AssetReference;

/// Result of creating or extending a ledger.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    /// Ledger file.
    pub path: PathBuf,
    /// Rows as written.
    pub rows: Vec<LedgerRow>,
    /// Rows created by this call.
    pub added: usize,
    /// References folded into rows that existed before this call.
    pub merged: usize,
}

/// Reads and writes ledger CSV files.
///
/// All I/O goes through the filesystem port, so writes are atomic whole-file
/// replacements on disk.
pub struct LedgerStore<'a> {
    fs: &'a dyn FileSystem,
    search: &'a SearchSettings,
}

impl<'a> LedgerStore<'a> {
    /// Creates a store. `search` is used to pre-fill manual search links.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, search: &'a SearchSettings) -> Self {
        Self { fs, search }
    }

    /// Reads every row of the ledger at `path`.
    ///
    /// Missing columns read as empty, a leading BOM is ignored, rows that
    /// cannot be decoded are skipped and bad sequence numbers are replaced
    /// by the row's position.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has no header row.
    pub fn read_all(&self, path: &Path) -> Result<Vec<LedgerRow>, String> {
        let text = self
            .fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read ledger {}: {e}", path.display()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());
        reader
            .headers()
            .map_err(|e| format!("Failed to read ledger header {}: {e}", path.display()))?;

        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<LedgerRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(path = %path.display(), record = index + 1, error = %e, "skipping unreadable ledger row");
                }
            }
        }
        for (index, row) in rows.iter_mut().enumerate() {
            if row.seq == 0 {
                row.seq = u32::try_from(index + 1).unwrap_or(u32::MAX);
            }
        }
        Ok(rows)
    }

    /// Replaces the ledger at `path` with `rows`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn write_all(&self, path: &Path, rows: &[LedgerRow]) -> Result<(), String> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| format!("Failed to encode ledger header: {e}"))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| format!("Failed to encode ledger row {}: {e}", row.filename))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| format!("Failed to encode ledger {}: {e}", path.display()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| format!("Ledger {} is not UTF-8: {e}", path.display()))?;
        self.fs
            .write(path, &text)
            .map_err(|e| format!("Failed to write ledger {}: {e}", path.display()))
    }

    /// Pending row with its manual search link filled in.
    fn new_row(&self, reference: &AssetReference) -> LedgerRow {
        let plan = SearchPlan::for_names(
            &reference.decision_name,
            &reference.query_term,
            &reference.node_type,
            self.search,
        );
        LedgerRow { search_link: plan.search_link(self.search), ..LedgerRow::pending(reference) }
    }

    /// Merges `refs` into the ledger at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing ledger cannot be read or the result
    /// cannot be written.
    pub fn create_or_append(
        &self,
        path: &Path,
        refs: &[AssetReference],
    ) -> Result<LedgerHandle, String> {
        let mut rows = if self.fs.exists(path) { self.read_all(path)? } else { Vec::new() };
        let counts = merge_references(&mut rows, refs, |r| self.new_row(r));
        self.write_all(path, &rows)?;
        tracing::info!(
            path = %path.display(),
            rows = rows.len(),
            added = counts.added,
            merged = counts.merged,
            "ledger written"
        );
        Ok(LedgerHandle {
            path: path.to_path_buf(),
            rows,
            added: counts.added,
            merged: counts.merged,
        })
    }
}
