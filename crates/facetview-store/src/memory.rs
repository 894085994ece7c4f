//! MemoryStore: an in-memory canonical content store.
//!
//! Nodes are kept in insertion order and addressed both by `NodeId` and by a
//! dense `u32` ordinal (the position in that order). Ordinals are what the
//! facet index stores in its bitmaps; they are never reused, so a removed
//! node simply leaves a hole.
//!
//! Every mutation bumps a generation counter. Dependent caches (the facet
//! index of `MemorySearchEngine`) compare generations and rebuild lazily.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use facetview_model::names::{MIX_REFERENCEABLE, PROP_PRIMARY_TYPE, PROP_UUID};
use facetview_model::{
    CanonicalNode, CanonicalStore, ChildEntry, ContextToken, NodeId, PropertyValue, StoreError,
    Value,
};

/// Identifier of the store root. References ending in the system sentinel
/// suffix resolve here and are never dereferenced by the engine.
pub const ROOT_ID: NodeId = NodeId::from_u128(0xcafebabe_cafe_babe_cafe_babecafebabe);
pub const ROOT_TYPE: &str = "core:root";

#[derive(Debug, Default, Clone)]
pub(crate) struct StoreState {
    /// Ordinal -> node (None once removed).
    pub(crate) slots: Vec<Option<CanonicalNode>>,
    pub(crate) ordinals: HashMap<NodeId, u32>,
    pub(crate) parents: HashMap<NodeId, NodeId>,
}

impl StoreState {
    pub(crate) fn node(&self, id: NodeId) -> Option<&CanonicalNode> {
        let ordinal = *self.ordinals.get(&id)?;
        self.slots.get(ordinal as usize)?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut CanonicalNode, StoreError> {
        let ordinal = *self.ordinals.get(&id).ok_or(StoreError::UnknownNode(id))?;
        self.slots
            .get_mut(ordinal as usize)
            .and_then(Option::as_mut)
            .ok_or(StoreError::UnknownNode(id))
    }

    pub(crate) fn ordinal(&self, id: NodeId) -> Option<u32> {
        let ordinal = *self.ordinals.get(&id)?;
        self.slots.get(ordinal as usize)?.as_ref().map(|_| ordinal)
    }

    pub(crate) fn by_ordinal(&self, ordinal: u32) -> Option<&CanonicalNode> {
        self.slots.get(ordinal as usize)?.as_ref()
    }

    /// Live nodes with their ordinals, in insertion order.
    pub(crate) fn live(&self) -> impl Iterator<Item = (u32, &CanonicalNode)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (i as u32, n)))
    }

    fn insert(&mut self, parent: Option<NodeId>, node: CanonicalNode) {
        let id = node.id;
        let ordinal = self.slots.len() as u32;
        self.slots.push(Some(node));
        self.ordinals.insert(id, ordinal);
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(ordinal) = self.ordinals.remove(&id) else {
            return;
        };
        self.parents.remove(&id);
        let Some(node) = self.slots.get_mut(ordinal as usize).and_then(Option::take) else {
            return;
        };
        for child in node.children {
            // Linked entries may point at nodes owned elsewhere.
            if self.parents.get(&child.id) == Some(&id) {
                self.remove_subtree(child.id);
            }
        }
    }
}

pub struct MemoryStore {
    state: RwLock<StoreState>,
    generation: AtomicU64,
}

impl MemoryStore {
    /// Empty store holding only the root node.
    pub fn new() -> Self {
        let mut state = StoreState::default();
        let mut root = CanonicalNode::new(ROOT_ID, ROOT_TYPE);
        root.mixins.insert(MIX_REFERENCEABLE.to_string());
        root.properties
            .insert(PROP_PRIMARY_TYPE.to_string(), PropertyValue::single(ROOT_TYPE));
        root.properties.insert(
            PROP_UUID.to_string(),
            PropertyValue::single(ROOT_ID.to_string()),
        );
        state.insert(None, root);
        Self::from_state(state)
    }

    pub(crate) fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
        }
    }

    pub const fn root_id(&self) -> NodeId {
        ROOT_ID
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.state.read().ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.state.read().node(id).is_some()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&*self.state.read())
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreState) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let mut guard = self.state.write();
        let out = f(&mut *guard)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add a node with a fresh identifier below `parent`.
    pub fn add_node(&self, parent: NodeId, name: &str, node_type: &str) -> Result<NodeId, StoreError> {
        self.add_node_with_id(parent, name, node_type, NodeId::new_v4())
    }

    pub fn add_node_with_id(
        &self,
        parent: NodeId,
        name: &str,
        node_type: &str,
        id: NodeId,
    ) -> Result<NodeId, StoreError> {
        self.write(|state| {
            if state.node(id).is_some() {
                return Err(StoreError::Backend(format!("node {id} already exists")));
            }
            state
                .node_mut(parent)?
                .children
                .push(ChildEntry::new(name, id));
            let mut node = CanonicalNode::new(id, node_type);
            node.properties
                .insert(PROP_PRIMARY_TYPE.to_string(), PropertyValue::single(node_type));
            state.insert(Some(parent), node);
            Ok(id)
        })
    }

    pub fn set_property(
        &self,
        id: NodeId,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), StoreError> {
        let value = value.into();
        self.write(|state| {
            state.node_mut(id)?.properties.insert(name.to_string(), value);
            Ok(())
        })
    }

    pub fn remove_property(&self, id: NodeId, name: &str) -> Result<Option<PropertyValue>, StoreError> {
        self.write(|state| Ok(state.node_mut(id)?.properties.remove(name)))
    }

    /// Add a capability tag. `mix:referenceable` also exposes the identity
    /// through `core:uuid`.
    pub fn add_mixin(&self, id: NodeId, mixin: &str) -> Result<(), StoreError> {
        self.write(|state| {
            let node = state.node_mut(id)?;
            node.mixins.insert(mixin.to_string());
            if mixin == MIX_REFERENCEABLE {
                node.properties.insert(
                    PROP_UUID.to_string(),
                    PropertyValue::single(Value::String(id.to_string())),
                );
            }
            Ok(())
        })
    }

    /// Append a child entry pointing at `target` without taking ownership of
    /// it. The target does not have to exist.
    pub fn link(&self, parent: NodeId, name: &str, target: NodeId) -> Result<(), StoreError> {
        self.write(|state| {
            state
                .node_mut(parent)?
                .children
                .push(ChildEntry::new(name, target));
            Ok(())
        })
    }

    /// Remove a node and the subtree it owns, detaching it from its parent.
    pub fn remove(&self, id: NodeId) -> Result<(), StoreError> {
        if id == ROOT_ID {
            return Err(StoreError::Backend("cannot remove the root node".to_string()));
        }
        self.write(|state| {
            if state.node(id).is_none() {
                return Err(StoreError::UnknownNode(id));
            }
            if let Some(parent) = state.parents.get(&id).copied() {
                if let Ok(p) = state.node_mut(parent) {
                    p.children.retain(|c| c.id != id);
                }
            }
            state.remove_subtree(id);
            Ok(())
        })
    }

    /// Remove a node but keep the entries that point at it, leaving them
    /// dangling (what a reader sees when a child was deleted in a newer
    /// revision than its parent).
    pub fn forget(&self, id: NodeId) -> Result<(), StoreError> {
        self.write(|state| {
            if state.node(id).is_none() {
                return Err(StoreError::UnknownNode(id));
            }
            state.remove_subtree(id);
            Ok(())
        })
    }

    /// Resolve a slash-separated path of child names from the root.
    pub fn resolve_path(&self, path: &str) -> Option<NodeId> {
        let state = self.state.read();
        let mut current = ROOT_ID;
        for name in path.split('/').filter(|s| !s.is_empty()) {
            let node = state.node(current)?;
            current = node.children.iter().find(|c| c.name == name)?.id;
        }
        state.node(current).map(|n| n.id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalStore for MemoryStore {
    fn get_node(&self, id: NodeId, _ctx: &ContextToken) -> Result<Option<CanonicalNode>, StoreError> {
        Ok(self.state.read().node(id).cloned())
    }

    fn get_parent(&self, id: NodeId, _ctx: &ContextToken) -> Result<Option<NodeId>, StoreError> {
        let state = self.state.read();
        if state.node(id).is_none() {
            return Ok(None);
        }
        Ok(state.parents.get(&id).copied())
    }

    fn get_property(
        &self,
        id: NodeId,
        name: &str,
        _ctx: &ContextToken,
    ) -> Result<Option<PropertyValue>, StoreError> {
        Ok(self
            .state
            .read()
            .node(id)
            .and_then(|n| n.properties.get(name).cloned()))
    }

    fn get_children(&self, id: NodeId, _ctx: &ContextToken) -> Result<Vec<ChildEntry>, StoreError> {
        Ok(self
            .state
            .read()
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default())
    }
}
