//! A recording session: one recorder per port, written to one directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::recorder::CassetteRecorder;

/// Shared recorder handle used by recording adapters.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Per-port recorders for one `MODEL_FINDER_RECORD` run.
pub struct RecordingSession {
    /// Recorder for clock interactions.
    pub clock: SharedRecorder,
    /// Recorder for filesystem interactions.
    pub fs: SharedRecorder,
    /// Recorder for ID generator interactions.
    pub id_gen: SharedRecorder,
    /// Recorder for search interactions.
    pub search: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Creates a session writing `<port>.cassette.yaml` files into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(output_dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            format!("Failed to create cassette directory {}: {e}", output_dir.display())
        })?;
        let make = |port: &str| -> SharedRecorder {
            Arc::new(Mutex::new(CassetteRecorder::new(
                output_dir.join(format!("{port}.cassette.yaml")),
                format!("model-finder-{port}"),
            )))
        };
        Ok(Self {
            clock: make("clock"),
            fs: make("fs"),
            id_gen: make("id_gen"),
            search: make("search"),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every port's cassette. Ports with no interactions are skipped.
    ///
    /// The recording adapters must be dropped first so each recorder has a
    /// single owner again.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorder is still shared or a file write fails.
    pub fn finish(self) -> Result<PathBuf, String> {
        for (port, shared) in
            [("clock", self.clock), ("fs", self.fs), ("id_gen", self.id_gen), ("search", self.search)]
        {
            let recorder = Arc::try_unwrap(shared)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            if recorder.is_empty() {
                continue;
            }
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
        }
        Ok(self.output_dir)
    }
}
