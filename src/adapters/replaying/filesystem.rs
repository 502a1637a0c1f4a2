//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{FileSystem, PortError};

/// Serves recorded filesystem results; paths are not checked.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates the adapter from a replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
        replay_result(&next_output(&self.replayer, "fs", "read_to_string"), "fs::read_to_string")
    }

    fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
        let output = next_output(&self.replayer, "fs", "write");
        if let Some(err) = output.get("err") {
            return Err(err.as_str().unwrap_or("unknown error").to_string().into());
        }
        Ok(())
    }

    fn exists(&self, _path: &Path) -> bool {
        next_output(&self.replayer, "fs", "exists")
            .as_bool()
            .expect("fs::exists: recorded output is not a boolean")
    }

    fn list_dir(&self, _path: &Path) -> Result<Vec<String>, PortError> {
        replay_result(&next_output(&self.replayer, "fs", "list_dir"), "fs::list_dir")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::replayer;
    use serde_json::json;

    #[test]
    fn serves_reads_errors_and_probes_in_order() {
        let fs = ReplayingFileSystem::new(replayer(&[
            ("fs", "read_to_string", json!({"ok": "{\"nodes\": []}"})),
            ("fs", "read_to_string", json!({"err": "file not found"})),
            ("fs", "exists", json!(false)),
            ("fs", "write", json!({"ok": null})),
        ]));
        assert_eq!(fs.read_to_string(Path::new("/w.json")).unwrap(), "{\"nodes\": []}");
        let err = fs.read_to_string(Path::new("/gone.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
        assert!(!fs.exists(Path::new("/models/a.ckpt")));
        assert!(fs.write(Path::new("/out.csv"), "x").is_ok());
    }
}
