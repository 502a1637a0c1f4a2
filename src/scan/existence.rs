//! Local presence checks for referenced model files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::AssetReference;
use crate::ports::FileSystem;

/// Memoized existence checks for one descriptor.
///
/// A name counts as present if it exists as given or relative to the
/// descriptor's directory. Names without an extension also probe each
/// configured model extension. The cache lives for one pass only.
pub struct ExistenceResolver<'a> {
    fs: &'a dyn FileSystem,
    base_dir: PathBuf,
    extensions: &'a [String],
    cache: HashMap<String, bool>,
}

impl<'a> ExistenceResolver<'a> {
    /// Creates a resolver probing relative to `base_dir`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, base_dir: &Path, extensions: &'a [String]) -> Self {
        Self { fs, base_dir: base_dir.to_path_buf(), extensions, cache: HashMap::new() }
    }

    fn probe(&self, name: &str) -> bool {
        self.fs.exists(Path::new(name)) || self.fs.exists(&self.base_dir.join(name))
    }

    /// Returns `true` if `query_term` resolves to a local file.
    pub fn exists(&mut self, query_term: &str) -> bool {
        if let Some(&known) = self.cache.get(query_term) {
            return known;
        }
        let mut found = self.probe(query_term);
        if !found && Path::new(query_term).extension().is_none() {
            found = self.extensions.iter().any(|ext| self.probe(&format!("{query_term}{ext}")));
        }
        tracing::trace!(name = query_term, found, "existence probe");
        self.cache.insert(query_term.to_string(), found);
        found
    }

    /// References whose query term is absent, stable-sorted by filename.
    pub fn find_missing(&mut self, refs: Vec<AssetReference>) -> Vec<AssetReference> {
        let mut missing: Vec<AssetReference> =
            refs.into_iter().filter(|r| !self.exists(&r.query_term)).collect();
        missing.sort_by(|a, b| a.original_filename.cmp(&b.original_filename));
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanSettings;
    use crate::testing::MemFs;

    fn reference(node_id: &str, name: &str) -> AssetReference {
        AssetReference {
            node_id: node_id.into(),
            node_type: "VAELoader".into(),
            raw_value: name.into(),
            original_filename: name.into(),
            decision_name: name.into(),
            query_term: name.into(),
        }
    }

    #[test]
    fn present_relative_to_descriptor_or_with_probed_extension() {
        let fs = MemFs::new();
        fs.insert("/wf/a.safetensors", "");
        fs.insert("/wf/b.ckpt", "");
        let extensions = ScanSettings::default().model_extensions;
        let mut resolver = ExistenceResolver::new(&fs, Path::new("/wf"), &extensions);

        assert!(resolver.exists("a.safetensors"));
        assert!(resolver.exists("b"));
        assert!(!resolver.exists("b.pt"));
        assert!(!resolver.exists("c"));
    }

    #[test]
    fn missing_references_are_sorted_and_duplicates_kept() {
        let fs = MemFs::new();
        fs.insert("/wf/present.pt", "");
        let extensions = ScanSettings::default().model_extensions;
        let mut resolver = ExistenceResolver::new(&fs, Path::new("/wf"), &extensions);

        let missing = resolver.find_missing(vec![
            reference("1", "z.pt"),
            reference("2", "present.pt"),
            reference("3", "a.pt"),
            reference("4", "z.pt"),
        ]);
        let ids: Vec<_> = missing.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "4"]);
    }

    #[test]
    fn results_are_cached_for_the_pass() {
        let fs = MemFs::new();
        let extensions = Vec::new();
        let mut resolver = ExistenceResolver::new(&fs, Path::new("/wf"), &extensions);
        assert!(!resolver.exists("late.pt"));
        fs.insert("/wf/late.pt", "");
        assert!(!resolver.exists("late.pt"));
    }
}
