//! Projected (virtual) nodes and result sets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::identity::VirtualNodeIdentity;
use crate::ids::NodeId;
use crate::value::PropertyValue;

/// Why a projection came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Reference was empty, a system sentinel, or pointed nowhere.
    NoTarget,
    /// Reference did not parse as an identifier.
    InvalidReference,
    /// Declared facet rules were malformed.
    MalformedCriteria,
    /// A facet-select dereferenced another facet-select.
    SelfReference,
    /// Identity chain too deep or cycling back to an ancestor target.
    RecursionLimit,
    /// A facet path did not resolve to recognized qualified names.
    UnresolvedFacet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Population {
    Populated,
    Empty(EmptyReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualNode {
    pub name: String,
    /// Absent for unpopulated nodes.
    pub identity: Option<Arc<VirtualNodeIdentity>>,
    pub node_type: Option<String>,
    pub mixins: BTreeSet<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<Arc<VirtualNodeIdentity>>,
    pub population: Population,
}

impl VirtualNode {
    pub fn unpopulated(name: impl Into<String>, reason: EmptyReason) -> Self {
        Self {
            name: name.into(),
            identity: None,
            node_type: None,
            mixins: BTreeSet::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
            population: Population::Empty(reason),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.population == Population::Populated
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self.population {
            Population::Populated => None,
            Population::Empty(reason) => Some(reason),
        }
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn child_ids(&self) -> Vec<NodeId> {
        self.children.iter().map(|c| c.canonical).collect()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A query-driven projection: total hit count plus the result node whose
/// children are the (limited) per-hit mirrors.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualResultSet {
    pub count: u64,
    pub node: VirtualNode,
}

impl VirtualResultSet {
    pub fn unpopulated(name: impl Into<String>, reason: EmptyReason) -> Self {
        Self {
            count: 0,
            node: VirtualNode::unpopulated(name, reason),
        }
    }

    pub fn hits(&self) -> &[Arc<VirtualNodeIdentity>] {
        &self.node.children
    }
}
