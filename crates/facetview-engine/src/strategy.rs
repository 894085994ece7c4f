//! Strategy table: canonical type -> projector kind.
//!
//! Stored provider nodes (mirrors, facet selects, facet searches) are routed
//! through this table instead of a process-wide provider registry. The same
//! table decides which targets count as facet-select-like for self-reference
//! rejection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use facetview_model::CanonicalNode;

/// What a provider node does with its docbase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectorKind {
    /// Dereference and mirror; declared criteria are ignored.
    PlainMirror,
    /// Dereference, compile declared facet rules and filter handle variants.
    HandleAware,
    /// Run a faceted query and mirror each hit.
    ResultSet,
}

impl ProjectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectorKind::PlainMirror => "plain-mirror",
            ProjectorKind::HandleAware => "handle-aware",
            ProjectorKind::ResultSet => "result-set",
        }
    }

    /// Whether the provider reads facet/value/mode arrays from its node.
    pub fn declares_criteria(self) -> bool {
        matches!(self, ProjectorKind::HandleAware)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyTable {
    by_type: BTreeMap<String, ProjectorKind>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_type: impl Into<String>, kind: ProjectorKind) -> Option<ProjectorKind> {
        self.by_type.insert(node_type.into(), kind)
    }

    pub fn with(mut self, node_type: impl Into<String>, kind: ProjectorKind) -> Self {
        self.insert(node_type, kind);
        self
    }

    pub fn get(&self, node_type: &str) -> Option<ProjectorKind> {
        self.by_type.get(node_type).copied()
    }

    /// Projector for a canonical node, looked up by its type tag.
    pub fn kind_of(&self, node: &CanonicalNode) -> Option<ProjectorKind> {
        self.get(&node.node_type)
    }

    /// True for nodes a facet select must never dereference to.
    pub fn is_facet_select_like(&self, node: &CanonicalNode) -> bool {
        self.kind_of(node) == Some(ProjectorKind::HandleAware)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ProjectorKind)> + '_ {
        self.by_type.iter().map(|(t, k)| (t.as_str(), *k))
    }
}

impl From<&BTreeMap<String, ProjectorKind>> for StrategyTable {
    fn from(map: &BTreeMap<String, ProjectorKind>) -> Self {
        Self { by_type: map.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetview_model::names::{NT_FACET_SELECT, NT_FOLDER};
    use facetview_model::NodeId;

    #[test]
    fn later_registration_replaces_kind() {
        let mut table = StrategyTable::new().with("acme:view", ProjectorKind::PlainMirror);
        let previous = table.insert("acme:view", ProjectorKind::HandleAware);
        assert_eq!(previous, Some(ProjectorKind::PlainMirror));
        assert_eq!(table.get("acme:view"), Some(ProjectorKind::HandleAware));
    }

    #[test]
    fn facet_select_like_follows_the_table() {
        let table = StrategyTable::new().with(NT_FACET_SELECT, ProjectorKind::HandleAware);
        let select = CanonicalNode::new(NodeId::from_u128(1), NT_FACET_SELECT);
        let folder = CanonicalNode::new(NodeId::from_u128(2), NT_FOLDER);
        assert!(table.is_facet_select_like(&select));
        assert!(!table.is_facet_select_like(&folder));
    }
}
