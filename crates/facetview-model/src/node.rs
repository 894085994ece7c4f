//! Canonical nodes as read from the store.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ids::NodeId;
use crate::value::PropertyValue;

/// One entry in a node's ordered child list. Names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub id: NodeId,
}

impl ChildEntry {
    pub fn new(name: impl Into<String>, id: NodeId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// An immutable-per-revision node of the canonical store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalNode {
    pub id: NodeId,
    pub node_type: String,
    #[serde(default)]
    pub mixins: BTreeSet<String>,
    #[serde(default)]
    pub children: Vec<ChildEntry>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl CanonicalNode {
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            mixins: BTreeSet::new(),
            children: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// True if `tag` is either the node type or one of its mixins.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.node_type == tag || self.mixins.contains(tag)
    }

    /// True if any of `tags` applies to this node.
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.has_tag(t.as_ref()))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// First value of a property in textual form.
    pub fn string_property(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)?
            .first()
            .map(|v| v.as_text().into_owned())
    }

    /// All values of a property in textual form.
    pub fn strings_property(&self, name: &str) -> Option<Vec<String>> {
        self.properties.get(name).map(PropertyValue::texts)
    }

    pub fn child_entry(&self, child: NodeId) -> Option<&ChildEntry> {
        self.children.iter().find(|c| c.id == child)
    }
}
