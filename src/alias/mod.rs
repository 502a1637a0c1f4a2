//! Irregular-name corrections.
//!
//! Some workflows reference files by names that do not exist anywhere (a
//! vendor prefix glued onto the real name, a typo, a renamed release). The
//! alias map records the corrected name for such references. It is loaded
//! once per run and passed by reference to the normalizer.
//!
//! On disk it is a JSON array of `{id, original_name, corrected_name, notes}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ports::{FileSystem, IdGenerator};

/// One correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Stable identifier, used for updates and removal.
    #[serde(default)]
    pub id: String,
    /// Name as it appears in workflows.
    #[serde(default)]
    pub original_name: String,
    /// Name to search for instead.
    #[serde(default)]
    pub corrected_name: String,
    /// Free-form note.
    #[serde(default)]
    pub notes: String,
}

/// Ordered collection of corrections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
}

/// Trims and collapses whitespace runs to a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl AliasMap {
    /// Builds a map from entries, keeping their order.
    #[must_use]
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    /// Loads the map from `path`.
    ///
    /// A missing file gives an empty map. So does a malformed one, with a
    /// warning: a broken alias file must not stop a scan.
    #[must_use]
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Self {
        Self::try_load(fs, path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "alias file ignored");
            Self::default()
        })
    }

    /// Loads the map from `path`, failing on an unreadable or malformed file.
    ///
    /// Editing commands use this so a save never replaces entries that
    /// could not be read. A missing file still gives an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn try_load(fs: &dyn FileSystem, path: &Path) -> Result<Self, String> {
        if !fs.exists(path) {
            tracing::debug!(path = %path.display(), "no alias file");
            return Ok(Self::default());
        }
        let content = fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read alias file {}: {e}", path.display()))?;
        let entries: Vec<AliasEntry> = serde_json::from_str(&content)
            .map_err(|e| format!("Malformed alias file {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded aliases");
        Ok(Self { entries })
    }

    /// Writes the map to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize aliases: {e}"))?;
        fs.write(path, &json)
            .map_err(|e| format!("Failed to write alias file {}: {e}", path.display()))
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Corrected name for `name`, if any entry matches.
    ///
    /// Match priority: exact, then whitespace-normalized, then
    /// case-insensitive. The first entry matching at the highest priority
    /// wins.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        if let Some(entry) = self.entries.iter().find(|e| e.original_name == name) {
            return Some(&entry.corrected_name);
        }
        let collapsed = collapse_whitespace(name);
        if let Some(entry) =
            self.entries.iter().find(|e| collapse_whitespace(&e.original_name) == collapsed)
        {
            return Some(&entry.corrected_name);
        }
        let lowered = name.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.original_name.to_lowercase() == lowered)
            .map(|e| e.corrected_name.as_str())
    }

    /// Adds a correction and returns its generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is empty or `original` already has
    /// an entry.
    pub fn add(
        &mut self,
        original: &str,
        corrected: &str,
        notes: &str,
        id_gen: &dyn IdGenerator,
    ) -> Result<String, String> {
        if original.trim().is_empty() || corrected.trim().is_empty() {
            return Err("Original and corrected names must not be empty".to_string());
        }
        if self.entries.iter().any(|e| e.original_name == original) {
            return Err(format!("An alias for '{original}' already exists"));
        }
        let id = id_gen.generate_id();
        self.entries.push(AliasEntry {
            id: id.clone(),
            original_name: original.to_string(),
            corrected_name: corrected.to_string(),
            notes: notes.to_string(),
        });
        tracing::info!(%id, original, corrected, "alias added");
        Ok(id)
    }

    /// Removes the entry with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no entry has that id.
    pub fn remove(&mut self, id: &str) -> Result<AliasEntry, String> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| format!("No alias with id '{id}'"))?;
        Ok(self.entries.remove(index))
    }

    /// Replaces the names and notes of the entry with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is empty, no entry has that id, or
    /// another entry already uses `original`.
    pub fn update(
        &mut self,
        id: &str,
        original: &str,
        corrected: &str,
        notes: &str,
    ) -> Result<(), String> {
        if original.trim().is_empty() || corrected.trim().is_empty() {
            return Err("Original and corrected names must not be empty".to_string());
        }
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| format!("No alias with id '{id}'"))?;
        if let Some(other) =
            self.entries.iter().enumerate().find(|(i, e)| *i != index && e.original_name == original)
        {
            return Err(format!("'{original}' is already mapped by alias {}", other.1.id));
        }
        let entry = &mut self.entries[index];
        entry.original_name = original.to_string();
        entry.corrected_name = corrected.to_string();
        entry.notes = notes.to_string();
        tracing::info!(id, original, corrected, "alias updated");
        Ok(())
    }
}
