//! The job ledger: one CSV row per missing model file.
//!
//! A ledger is created from scan results, then rewritten after every
//! resolution step. The file on disk is the durable state; rerunning
//! resolution against it picks up where the last run stopped.

pub mod paths;
pub mod store;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use store::{LedgerHandle, LedgerStore};

use crate::scan::AssetReference;

/// Column names written in the header row.
pub const HEADER: [&str; 8] = [
    "seq",
    "node_ids",
    "node_types",
    "filename",
    "status",
    "download_link",
    "mirror_link",
    "search_link",
];

/// Resolution state of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowStatus {
    /// Not attempted yet. Written as an empty cell.
    #[default]
    Pending,
    /// A usable link was stored.
    Resolved,
    /// Only a redirector link was stored; following it failed.
    RedirectOnly,
    /// The search returned nothing usable.
    NotFound,
    /// The search itself failed.
    Error,
}

impl RowStatus {
    /// Cell text for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "",
            Self::Resolved => "RESOLVED",
            Self::RedirectOnly => "REDIRECT_ONLY",
            Self::NotFound => "NOT_FOUND",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            other => other.as_str(),
        })
    }
}

impl From<String> for RowStatus {
    /// Parses a status cell. Labels written by the previous tool are
    /// understood; anything unrecognized reads as pending so it is retried.
    fn from(cell: String) -> Self {
        let cell = cell.trim();
        match cell.to_ascii_uppercase().as_str() {
            "RESOLVED" => return Self::Resolved,
            "REDIRECT_ONLY" => return Self::RedirectOnly,
            "NOT_FOUND" => return Self::NotFound,
            "ERROR" => return Self::Error,
            _ => {}
        }
        if cell == "已处理" {
            Self::Resolved
        } else if cell.starts_with("找到搜索链接") {
            Self::RedirectOnly
        } else if cell.starts_with("未找到") {
            Self::NotFound
        } else if cell.starts_with("搜索错误") {
            Self::Error
        } else {
            Self::Pending
        }
    }
}

impl From<RowStatus> for String {
    fn from(status: RowStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One missing file and what resolution found for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// 1-based position. Unparsable cells read as 0 and are renumbered.
    #[serde(default, alias = "序号", deserialize_with = "lenient_seq")]
    pub seq: u32,
    /// Comma-joined ids of every node referencing the file.
    #[serde(default, alias = "节点ID")]
    pub node_ids: String,
    /// Comma-joined distinct node types.
    #[serde(default, alias = "节点类型")]
    pub node_types: String,
    /// Canonical filename; unique within a ledger.
    #[serde(default, alias = "文件名")]
    pub filename: String,
    /// Resolution state.
    #[serde(default, alias = "状态")]
    pub status: RowStatus,
    /// Direct download URL (international results).
    #[serde(default, alias = "下载链接")]
    pub download_link: String,
    /// Same file on the mirror host.
    #[serde(default, alias = "镜像链接")]
    pub mirror_link: String,
    /// Manual search URL, or the found page for domestic results.
    #[serde(default, alias = "搜索链接")]
    pub search_link: String,
}

fn lenient_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let cell = String::deserialize(deserializer)?;
    Ok(cell.trim().parse().unwrap_or(0))
}

impl LedgerRow {
    /// Starts a pending row for one reference.
    #[must_use]
    pub fn pending(reference: &AssetReference) -> Self {
        Self {
            node_ids: reference.node_id.clone(),
            node_types: reference.node_type.clone(),
            filename: reference.original_filename.clone(),
            ..Self::default()
        }
    }

    /// Adds a referencing node, ignoring ids and types already listed.
    pub fn absorb(&mut self, node_id: &str, node_type: &str) {
        push_distinct(&mut self.node_ids, node_id);
        push_distinct(&mut self.node_types, node_type);
    }

    /// Returns `true` if a finished row needs no further attempt.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == RowStatus::Resolved
            && (!self.download_link.is_empty() || !self.search_link.is_empty())
    }
}

/// Appends `item` to a comma-joined list unless already present.
fn push_distinct(list: &mut String, item: &str) {
    let item = item.trim();
    if item.is_empty() || list.split(',').any(|existing| existing.trim() == item) {
        return;
    }
    if !list.is_empty() {
        list.push(',');
    }
    list.push_str(item);
}

/// Outcome of [`merge_references`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    /// Rows created for new filenames.
    pub added: usize,
    /// References folded into rows that already existed.
    pub merged: usize,
}

/// Folds references into `rows`, one row per filename.
///
/// References to a filename already present extend that row. New filenames
/// become pending rows appended in filename order, built by `new_row`.
/// Sequence numbers are renumbered 1..n afterwards.
pub fn merge_references<F>(
    rows: &mut Vec<LedgerRow>,
    refs: &[AssetReference],
    new_row: F,
) -> MergeCounts
where
    F: Fn(&AssetReference) -> LedgerRow,
{
    let mut counts = MergeCounts::default();
    let existing = rows.len();
    let mut sorted: Vec<&AssetReference> = refs.iter().collect();
    sorted.sort_by(|a, b| a.original_filename.cmp(&b.original_filename));

    for reference in sorted {
        match rows.iter().position(|r| r.filename == reference.original_filename) {
            Some(index) => {
                rows[index].absorb(&reference.node_id, &reference.node_type);
                if index < existing {
                    counts.merged += 1;
                }
            }
            None => {
                rows.push(new_row(reference));
                counts.added += 1;
            }
        }
    }
    renumber(rows);
    counts
}

/// Renumbers rows 1..n in their current order.
pub fn renumber(rows: &mut [LedgerRow]) {
    for (index, row) in rows.iter_mut().enumerate() {
        row.seq = u32::try_from(index + 1).unwrap_or(u32::MAX);
    }
}
