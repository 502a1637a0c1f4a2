//! Runtime configuration.
//!
//! Settings come from an optional YAML file (`model_finder.yaml`, or the
//! path in `MODEL_FINDER_CONFIG`) layered over built-in defaults, with a
//! couple of environment overrides for paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::FileSystem;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "model_finder.yaml";

/// Node-type key used in `indices` for types without their own entry.
pub const DEFAULT_INDEX_KEY: &str = "default";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Reference extraction and existence checks.
    pub scan: ScanSettings,
    /// Search domains and link rewriting.
    pub search: SearchSettings,
    /// Pacing of resolution runs.
    pub resolve: ResolveSettings,
    /// Batch validation pool.
    pub batch: BatchSettings,
    /// Output and alias file locations.
    pub paths: PathSettings,
}

/// Which nodes and widget positions hold model filenames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Node types known to reference model files.
    pub asset_node_types: Vec<String>,
    /// Widget positions to inspect per node type; `default` applies to the rest.
    pub node_indices: BTreeMap<String, IndexList>,
    /// Extensions probed for names that have none.
    pub model_extensions: Vec<String>,
    /// Nodes beyond this count are not inspected.
    pub max_nodes: usize,
    /// Property key that can override a node's declared type.
    pub type_override_key: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let asset_node_types = [
            "CheckpointLoader",
            "CheckpointLoaderSimple",
            "VAELoader",
            "LoraLoader",
            "LoraLoaderModelOnly",
            "UNETLoader",
            "CLIPLoader",
            "DualCLIPLoader",
            "TripleCLIPLoader",
            "CLIPVisionLoader",
            "ControlNetLoader",
            "UpscaleModelLoader",
            "IPAdapterModelLoader",
            "InstantIDModelLoader",
            "ModelLoader",
        ]
        .map(String::from)
        .to_vec();
        let node_indices = BTreeMap::from([
            (DEFAULT_INDEX_KEY.to_string(), IndexList(vec![0])),
            ("DualCLIPLoader".to_string(), IndexList(vec![0, 1])),
            ("TripleCLIPLoader".to_string(), IndexList(vec![0, 1, 2])),
        ]);
        let model_extensions = [".safetensors", ".pth", ".ckpt", ".pt", ".bin", ".onnx"]
            .map(String::from)
            .to_vec();
        Self {
            asset_node_types,
            node_indices,
            model_extensions,
            max_nodes: 1000,
            type_override_key: "Node name for S&R".to_string(),
        }
    }
}

impl ScanSettings {
    /// Widget positions to inspect for `node_type`.
    #[must_use]
    pub fn indices_for(&self, node_type: &str) -> &[usize] {
        self.node_indices
            .get(node_type)
            .or_else(|| self.node_indices.get(DEFAULT_INDEX_KEY))
            .map_or(&[0], |list| list.0.as_slice())
    }
}

/// Widget positions for one node type. Accepts a single integer or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct IndexList(pub Vec<usize>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(usize),
    Many(Vec<usize>),
}

impl From<OneOrMany> for IndexList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(index) => Self(vec![index]),
            OneOrMany::Many(indices) => Self(indices),
        }
    }
}

/// Search domains, query endpoint and link rewriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Target for names without CJK characters.
    pub international_domain: String,
    /// Target for names with CJK characters.
    pub domestic_domain: String,
    /// Host that mirrors the international domain's file paths.
    pub mirror_base: String,
    /// Result-page endpoint queried by the live provider.
    pub engine_url: String,
    /// Per-request timeout of the live provider.
    pub request_timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            international_domain: "huggingface.co".to_string(),
            domestic_domain: "liblib.art".to_string(),
            mirror_base: "https://hf-mirror.com".to_string(),
            engine_url: "https://www.bing.com/search".to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl SearchSettings {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Randomized pause between resolved rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveSettings {
    /// Lower bound of the inter-row delay.
    pub delay_min_ms: u64,
    /// Upper bound of the inter-row delay.
    pub delay_max_ms: u64,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self { delay_min_ms: 800, delay_max_ms: 1800 }
    }
}

/// Batch validation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Concurrent validation tasks.
    pub max_workers: usize,
    /// Time allowed to read and parse one candidate.
    pub validation_timeout_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { max_workers: 8, validation_timeout_ms: 5_000 }
    }
}

impl BatchSettings {
    /// Validation timeout as a `Duration`.
    #[must_use]
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Root of the dated ledger folders.
    pub output_root: PathBuf,
    /// Alias map JSON file.
    pub alias_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("results"),
            alias_file: PathBuf::from("irregular_names_map.json"),
        }
    }
}

impl FinderConfig {
    /// Loads `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, String> {
        if !fs.exists(path) {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads the config named by the environment and applies path overrides.
    ///
    /// `explicit` (the `--config` flag) wins over `MODEL_FINDER_CONFIG`.
    /// `MODEL_FINDER_OUTPUT` and `MODEL_FINDER_ALIASES` replace the
    /// corresponding paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected config file is malformed.
    pub fn from_env(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Self, String> {
        let path = explicit.map_or_else(
            || {
                std::env::var("MODEL_FINDER_CONFIG")
                    .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
            },
            Path::to_path_buf,
        );
        let mut config = Self::load(fs, &path)?;
        if let Ok(output) = std::env::var("MODEL_FINDER_OUTPUT") {
            config.paths.output_root = PathBuf::from(output);
        }
        if let Ok(aliases) = std::env::var("MODEL_FINDER_ALIASES") {
            config.paths.alias_file = PathBuf::from(aliases);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::LiveFileSystem;

    #[test]
    fn missing_file_yields_defaults() {
        let config =
            FinderConfig::load(&LiveFileSystem, Path::new("/nonexistent/model_finder.yaml"))
                .unwrap();
        assert_eq!(config, FinderConfig::default());
        assert_eq!(config.scan.max_nodes, 1000);
        assert_eq!(config.search.international_domain, "huggingface.co");
    }

    #[test]
    fn partial_file_keeps_other_defaults_and_accepts_single_index() {
        let dir = std::env::temp_dir().join("model_finder_config_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model_finder.yaml");
        std::fs::write(
            &path,
            "scan:\n  node_indices:\n    default: [0]\n    LoraLoader: 1\n    DualCLIPLoader: [0, 1]\nresolve:\n  delay_min_ms: 0\n  delay_max_ms: 0\n",
        )
        .unwrap();

        let config = FinderConfig::load(&LiveFileSystem, &path).unwrap();
        assert_eq!(config.scan.indices_for("LoraLoader"), &[1]);
        assert_eq!(config.scan.indices_for("DualCLIPLoader"), &[0, 1]);
        assert_eq!(config.scan.indices_for("SomethingElse"), &[0]);
        assert_eq!(config.resolve.delay_max_ms, 0);
        assert_eq!(config.batch, BatchSettings::default());
        assert!(config.scan.model_extensions.contains(&".safetensors".to_string()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join("model_finder_config_malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model_finder.yaml");
        std::fs::write(&path, "scan: [unclosed").unwrap();

        let err = FinderConfig::load(&LiveFileSystem, &path).unwrap_err();
        assert!(err.contains("Failed to parse config"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
