//! Engine configuration.
//!
//! Every field has a serde default, so a config file only needs to name what
//! it overrides:
//!
//! ```json
//! { "default_limit": 50, "kinds": { "handle_types": ["content:handle", "acme:bundle"] } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use facetview_model::names::{
    DEFAULT_RESULT_LIMIT, DENIED_PROPERTIES, KNOWN_NAMESPACES, NT_DOCUMENT, NT_FACET_SEARCH,
    NT_FACET_SELECT, NT_HANDLE, NT_MIRROR, NT_REQUEST, NT_TRANSLATION, QUERY_DELIMITER,
    SYSTEM_SENTINEL_SUFFIX,
};
use facetview_model::CanonicalNode;

use crate::strategy::ProjectorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Result-set limit used when a request does not carry one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// References ending in this suffix point into system areas and are
    /// never dereferenced
    #[serde(default = "default_sentinel_suffix")]
    pub sentinel_suffix: String,

    /// Separates the docbase from the inherited filter in a query string
    #[serde(default = "default_query_delimiter")]
    pub query_delimiter: String,

    /// Deepest identity chain `expand` will still dereference
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Properties the mirror assembler never copies
    #[serde(default = "default_denied_properties")]
    pub denied_properties: Vec<String>,

    #[serde(default)]
    pub kinds: NodeKinds,

    /// Canonical type -> projector used for stored provider nodes
    #[serde(default = "default_strategies")]
    pub strategies: BTreeMap<String, ProjectorKind>,

    /// Namespace prefixes accepted in facet paths
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            sentinel_suffix: default_sentinel_suffix(),
            query_delimiter: default_query_delimiter(),
            max_depth: default_max_depth(),
            denied_properties: default_denied_properties(),
            kinds: NodeKinds::default(),
            strategies: default_strategies(),
            namespaces: default_namespaces(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.default_limit == 0 {
            anyhow::bail!("config {}: default_limit must be positive", path.display());
        }
        Ok(config)
    }

    pub fn is_denied(&self, property: &str) -> bool {
        self.denied_properties.iter().any(|p| p == property)
    }

    pub fn is_known_namespace(&self, prefix: &str) -> bool {
        self.namespaces.iter().any(|n| n == prefix)
    }
}

/// Which type (or capability) tags mark the special node kinds.
///
/// A node belongs to a kind when its type or any of its mixins is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeKinds {
    #[serde(default = "default_handle_types")]
    pub handle_types: Vec<String>,
    #[serde(default = "default_document_types")]
    pub document_types: Vec<String>,
    #[serde(default = "default_request_types")]
    pub request_types: Vec<String>,
    #[serde(default = "default_translation_types")]
    pub translation_types: Vec<String>,
}

impl Default for NodeKinds {
    fn default() -> Self {
        Self {
            handle_types: default_handle_types(),
            document_types: default_document_types(),
            request_types: default_request_types(),
            translation_types: default_translation_types(),
        }
    }
}

impl NodeKinds {
    pub fn is_handle(&self, node: &CanonicalNode) -> bool {
        node.has_any_tag(&self.handle_types)
    }

    pub fn is_document(&self, node: &CanonicalNode) -> bool {
        node.has_any_tag(&self.document_types)
    }

    pub fn is_request(&self, node: &CanonicalNode) -> bool {
        node.has_any_tag(&self.request_types)
    }

    pub fn is_translation(&self, node: &CanonicalNode) -> bool {
        node.has_any_tag(&self.translation_types)
    }
}

fn default_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

fn default_sentinel_suffix() -> String {
    SYSTEM_SENTINEL_SUFFIX.to_string()
}

fn default_query_delimiter() -> String {
    QUERY_DELIMITER.to_string()
}

fn default_max_depth() -> usize {
    32
}

fn default_denied_properties() -> Vec<String> {
    DENIED_PROPERTIES.iter().map(|p| p.to_string()).collect()
}

fn default_strategies() -> BTreeMap<String, ProjectorKind> {
    BTreeMap::from([
        (NT_MIRROR.to_string(), ProjectorKind::PlainMirror),
        (NT_FACET_SELECT.to_string(), ProjectorKind::HandleAware),
        (NT_FACET_SEARCH.to_string(), ProjectorKind::ResultSet),
    ])
}

fn default_namespaces() -> Vec<String> {
    KNOWN_NAMESPACES.iter().map(|n| n.to_string()).collect()
}

fn default_handle_types() -> Vec<String> {
    vec![NT_HANDLE.to_string()]
}

fn default_document_types() -> Vec<String> {
    vec![NT_DOCUMENT.to_string()]
}

fn default_request_types() -> Vec<String> {
    vec![NT_REQUEST.to_string()]
}

fn default_translation_types() -> Vec<String> {
    vec![NT_TRANSLATION.to_string()]
}
