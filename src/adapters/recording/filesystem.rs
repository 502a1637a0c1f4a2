//! Recording adapter for the `FileSystem` port.

use std::path::Path;

use serde_json::json;

use super::{record_interaction, record_result};
use crate::cassette::session::SharedRecorder;
use crate::ports::{FileSystem, PortError};

/// Captures filesystem calls. Written contents are stored by length only,
/// since ledgers can be large and are reproduced by replay anyway.
pub struct RecordingFileSystem {
    inner: Box<dyn FileSystem>,
    recorder: SharedRecorder,
}

impl RecordingFileSystem {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn FileSystem>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

fn path_input(path: &Path) -> serde_json::Value {
    json!({ "path": path.display().to_string() })
}

impl FileSystem for RecordingFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let result = self.inner.read_to_string(path);
        record_result(&self.recorder, "fs", "read_to_string", &path_input(path), &result);
        result
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let result = self.inner.write(path, contents);
        let input = json!({"path": path.display().to_string(), "bytes": contents.len()});
        record_result(&self.recorder, "fs", "write", &input, &result);
        result
    }

    fn exists(&self, path: &Path) -> bool {
        let present = self.inner.exists(path);
        record_interaction(&self.recorder, "fs", "exists", &path_input(path), &present);
        present
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let result = self.inner.list_dir(path);
        record_result(&self.recorder, "fs", "list_dir", &path_input(path), &result);
        result
    }
}
