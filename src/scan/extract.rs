//! Reference extraction from workflow descriptors.
//!
//! A descriptor is a JSON object with a `nodes` array. Each node names its
//! type and carries positional `widgets_values`; for loader nodes some of
//! those positions hold model filenames.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalize::normalize;
use super::AssetReference;
use crate::alias::AliasMap;
use crate::config::ScanSettings;

/// Widget values that are UI placeholders rather than filenames.
const PLACEHOLDER_VALUES: &[&str] = &["default", "none", "empty", "auto", "off", "on"];

/// A parsed descriptor. Nodes are decoded lazily during extraction.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDescriptor {
    nodes: Vec<Value>,
}

impl WorkflowDescriptor {
    /// Number of nodes in the descriptor.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// One graph node, as far as extraction cares.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    /// Node identifier, rendered as text whether stored as number or string.
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    /// Declared node type.
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Free-form node properties. Only an object can carry the type override.
    #[serde(default)]
    pub properties: Value,
    /// Positional widget values. Anything but an array counts as empty.
    #[serde(default)]
    pub widgets_values: Value,
}

fn id_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(serde::de::Error::custom(format!("unsupported node id: {other}"))),
    }
}

impl NodeRecord {
    fn widgets(&self) -> &[Value] {
        self.widgets_values.as_array().map_or(&[], Vec::as_slice)
    }
}

/// Parses descriptor text.
///
/// # Errors
///
/// Returns an error if the text is not JSON, not an object, or has no
/// `nodes` array.
pub fn parse_descriptor(text: &str) -> Result<WorkflowDescriptor, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("Invalid workflow JSON: {e}"))?;
    let Value::Object(mut object) = value else {
        return Err("Workflow is not a JSON object".to_string());
    };
    match object.remove("nodes") {
        Some(Value::Array(nodes)) => Ok(WorkflowDescriptor { nodes }),
        Some(_) => Err("Workflow 'nodes' is not an array".to_string()),
        None => Err("Workflow has no 'nodes' array".to_string()),
    }
}

/// Named heuristic: custom loader nodes usually carry "Loader" in their type.
#[must_use]
pub fn is_loader_heuristic(node_type: &str) -> bool {
    node_type.contains("Loader")
}

/// Trailing path component, accepting both separator styles.
fn basename(value: &str) -> &str {
    value.rsplit(['/', '\\']).next().unwrap_or(value)
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_VALUES.iter().any(|p| value.eq_ignore_ascii_case(p))
}

/// Pulls asset references out of descriptors.
pub struct ReferenceExtractor<'a> {
    settings: &'a ScanSettings,
    aliases: &'a AliasMap,
}

impl<'a> ReferenceExtractor<'a> {
    /// Creates an extractor over the given settings and aliases.
    #[must_use]
    pub fn new(settings: &'a ScanSettings, aliases: &'a AliasMap) -> Self {
        Self { settings, aliases }
    }

    fn is_asset_type(&self, node_type: &str) -> bool {
        self.settings.asset_node_types.iter().any(|t| t == node_type)
    }

    /// Declared type, unless the override property names a known asset type.
    fn effective_type(&self, node: &NodeRecord) -> String {
        node.properties
            .as_object()
            .and_then(|props| props.get(&self.settings.type_override_key))
            .and_then(Value::as_str)
            .filter(|name| self.is_asset_type(name))
            .map_or_else(|| node.node_type.clone(), String::from)
    }

    /// All references in node order, nodes beyond `max_nodes` ignored.
    #[must_use]
    pub fn extract(&self, descriptor: &WorkflowDescriptor) -> Vec<AssetReference> {
        if descriptor.nodes.len() > self.settings.max_nodes {
            tracing::debug!(
                nodes = descriptor.nodes.len(),
                limit = self.settings.max_nodes,
                "node limit reached; remaining nodes ignored"
            );
        }
        let mut refs = Vec::new();
        for raw in descriptor.nodes.iter().take(self.settings.max_nodes) {
            let node = match NodeRecord::deserialize(raw) {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable node");
                    continue;
                }
            };
            self.extract_node(&node, &mut refs);
        }
        refs
    }

    fn extract_node(&self, node: &NodeRecord, refs: &mut Vec<AssetReference>) {
        let node_type = self.effective_type(node);
        if !self.is_asset_type(&node_type) && !is_loader_heuristic(&node_type) {
            return;
        }
        let widgets = node.widgets();
        for &index in self.settings.indices_for(&node_type) {
            let Some(value) = widgets.get(index).and_then(Value::as_str) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() || value.contains(['\n', '\r']) || is_placeholder(value) {
                continue;
            }
            let filename = basename(value);
            if filename.is_empty() {
                continue;
            }
            let normalized = normalize(filename, self.aliases);
            refs.push(AssetReference {
                node_id: node.id.clone(),
                node_type: node_type.clone(),
                raw_value: value.to_string(),
                original_filename: filename.to_string(),
                decision_name: normalized.mapped,
                query_term: normalized.query_term,
            });
        }
    }
}
