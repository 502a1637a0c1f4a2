//! Per-port cassette selection for replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Optional cassette file per port. Ports left as `None` are replaced by
/// panicking stubs during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the clock port.
    pub clock: Option<PathBuf>,
    /// Cassette for the filesystem port.
    pub fs: Option<PathBuf>,
    /// Cassette for the ID generator port.
    pub id_gen: Option<PathBuf>,
    /// Cassette for the search port.
    pub search: Option<PathBuf>,
}

/// Loaded replayers, one per configured port.
pub struct PortReplayers {
    /// Replayer for the clock port.
    pub clock: Option<CassetteReplayer>,
    /// Replayer for the filesystem port.
    pub fs: Option<CassetteReplayer>,
    /// Replayer for the ID generator port.
    pub id_gen: Option<CassetteReplayer>,
    /// Replayer for the search port.
    pub search: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// A config with no cassettes: every port panics when used.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Reads and parses one cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a cassette.
    pub fn load_cassette(path: &Path) -> Result<Cassette, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Loads every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette cannot be loaded.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: &Option<PathBuf>| -> Result<Option<CassetteReplayer>, String> {
            path.as_deref()
                .map(|p| Self::load_cassette(p).map(|c| CassetteReplayer::new(&c)))
                .transpose()
        };
        Ok(PortReplayers {
            clock: load(&self.clock)?,
            fs: load(&self.fs)?,
            id_gen: load(&self.id_gen)?,
            search: load(&self.search)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn only_configured_ports_get_replayers() {
        let dir = std::env::temp_dir().join("model_finder_cassette_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("search.cassette.yaml");

        let mut cassette = Cassette::new("search", Utc::now());
        cassette.interactions.push(Interaction {
            seq: 0,
            port: "search".into(),
            method: "query".into(),
            input: json!({}),
            output: json!({"ok": null}),
        });
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let config = CassetteConfig { search: Some(path), ..CassetteConfig::default() };
        let mut replayers = config.load_all().unwrap();
        assert!(replayers.clock.is_none());
        assert!(replayers.fs.is_none());
        let search = replayers.search.as_mut().unwrap();
        assert_eq!(search.next_interaction("search", "query").output, json!({"ok": null}));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_cassette_is_an_error() {
        let config = CassetteConfig {
            clock: Some(PathBuf::from("/nonexistent/model_finder/clock.cassette.yaml")),
            ..CassetteConfig::default()
        };
        let err = config.load_all().err().expect("missing file should fail");
        assert!(err.contains("Failed to read cassette file"));
    }
}
