//! Live filesystem adapter using `std::fs`.

use std::path::{Path, PathBuf};

use crate::ports::{FileSystem, PortError};

/// Filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

/// Sibling path used while a write is in flight.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsString::from).unwrap_or_default();
    name.push(format!(".{}.partial", std::process::id()));
    path.with_file_name(name)
}

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let staging = staging_path(path);
        std::fs::write(&staging, contents)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.try_exists().unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            if let Some(name) = entry?.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_contents_and_leaves_no_staging_file() {
        let dir = std::env::temp_dir().join("model_finder_live_fs_write");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("ledger.csv");

        LiveFileSystem.write(&path, "first").unwrap();
        LiveFileSystem.write(&path, "second").unwrap();

        assert_eq!(LiveFileSystem.read_to_string(&path).unwrap(), "second");
        assert_eq!(LiveFileSystem.list_dir(&dir.join("nested")).unwrap(), vec!["ledger.csv"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn exists_is_false_for_missing_paths() {
        assert!(!LiveFileSystem.exists(Path::new("/nonexistent/model_finder/x.safetensors")));
        assert!(LiveFileSystem.exists(&std::env::temp_dir()));
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = std::env::temp_dir().join("model_finder_live_fs_list");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.json", "a.json", "c.txt"] {
            std::fs::write(dir.join(name), "{}").unwrap();
        }
        assert_eq!(LiveFileSystem.list_dir(&dir).unwrap(), vec!["a.json", "b.json", "c.txt"]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
