//! Workflow scanning: which model files does a workflow need that are not
//! on disk?
//!
//! Scanning is a three-step pipeline over one descriptor:
//! extraction ([`extract`]), normalization ([`normalize`]) and existence
//! checks ([`existence`]).

pub mod existence;
pub mod extract;
pub mod normalize;

use std::path::Path;

pub use existence::ExistenceResolver;
pub use extract::{parse_descriptor, ReferenceExtractor, WorkflowDescriptor};
pub use normalize::{contains_cjk, normalize, Normalized};

use crate::alias::AliasMap;
use crate::config::ScanSettings;
use crate::ports::FileSystem;

/// One model file referenced by one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Id of the referencing node.
    pub node_id: String,
    /// Effective node type.
    pub node_type: String,
    /// Trimmed widget text, path included.
    pub raw_value: String,
    /// Basename of `raw_value`; the ledger's dedup key.
    pub original_filename: String,
    /// Alias-corrected name used for domain selection.
    pub decision_name: String,
    /// Alias-corrected, prefix-stripped name used for search and probing.
    pub query_term: String,
}

/// Missing references of the workflow at `path`.
///
/// An unreadable or malformed file yields an empty list and a logged error.
#[must_use]
pub fn scan_workflow(
    fs: &dyn FileSystem,
    settings: &ScanSettings,
    aliases: &AliasMap,
    path: &Path,
) -> Vec<AssetReference> {
    let text = match fs.read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read workflow");
            return Vec::new();
        }
    };
    let descriptor = match parse_descriptor(&text) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "invalid workflow");
            return Vec::new();
        }
    };
    let refs = ReferenceExtractor::new(settings, aliases).extract(&descriptor);
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let missing =
        ExistenceResolver::new(fs, base_dir, &settings.model_extensions).find_missing(refs);
    tracing::info!(path = %path.display(), missing = missing.len(), "scanned workflow");
    missing
}
