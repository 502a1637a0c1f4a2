//! Cassette data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call on a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording, assigned by the recorder.
    pub seq: u64,
    /// Port name: `clock`, `fs`, `id_gen` or `search`.
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Arguments, for humans reading the cassette. Replay ignores them.
    pub input: serde_json::Value,
    /// Value returned by the port.
    pub output: serde_json::Value,
}

/// An ordered set of interactions plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the recording was finished.
    pub recorded_at: DateTime<Utc>,
    /// Version of the tool that produced the recording.
    #[serde(default)]
    pub tool_version: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Creates an empty cassette stamped with the current crate version.
    #[must_use]
    pub fn new(name: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            recorded_at,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            interactions: Vec::new(),
        }
    }
}
