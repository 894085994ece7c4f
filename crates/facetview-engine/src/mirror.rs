//! Mirror assembly: the virtual copy of one canonical node.
//!
//! The copy keeps the canonical type. Its capability tags lose the
//! referenceable/versionable markers and gain a soft-document or soft-handle
//! marker. Its identity property never collides with the canonical one:
//! documents and handles expose it under the virtual identity name, every
//! other node drops it. Deny-listed properties are always omitted.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use facetview_model::names::{
    MIX_REFERENCEABLE, MIX_SOFT_DOCUMENT, MIX_SOFT_HANDLE, MIX_VERSIONABLE, PROP_UUID,
    PROP_VIRTUAL_UUID,
};
use facetview_model::{
    CanonicalNode, Population, PropertyValue, VirtualNode, VirtualNodeIdentity,
};

use crate::config::EngineConfig;

pub struct MirrorAssembler<'a> {
    config: &'a EngineConfig,
}

impl<'a> MirrorAssembler<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        node: &CanonicalNode,
        identity: Arc<VirtualNodeIdentity>,
        children: Vec<Arc<VirtualNodeIdentity>>,
    ) -> VirtualNode {
        VirtualNode {
            name: identity.name.clone(),
            identity: Some(identity),
            node_type: Some(node.node_type.clone()),
            mixins: self.mixins(node),
            properties: self.properties(node),
            children,
            population: Population::Populated,
        }
    }

    pub fn mixins(&self, node: &CanonicalNode) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = node
            .mixins
            .iter()
            .filter(|m| *m != MIX_REFERENCEABLE && *m != MIX_VERSIONABLE)
            .cloned()
            .collect();
        if self.config.kinds.is_document(node) {
            out.insert(MIX_SOFT_DOCUMENT.to_string());
        } else if self.config.kinds.is_handle(node) {
            out.insert(MIX_SOFT_HANDLE.to_string());
        }
        out
    }

    pub fn properties(&self, node: &CanonicalNode) -> BTreeMap<String, PropertyValue> {
        let keeps_identity = self.config.kinds.is_document(node) || self.config.kinds.is_handle(node);
        let mut out = BTreeMap::new();
        for (name, value) in &node.properties {
            if self.config.is_denied(name) {
                continue;
            }
            if name == PROP_UUID {
                if keeps_identity {
                    out.insert(PROP_VIRTUAL_UUID.to_string(), value.clone());
                }
                continue;
            }
            out.insert(name.clone(), value.clone());
        }
        out
    }
}
