//! The canonical store seam.
//!
//! The projection engine only reads. Identifiers that do not refer to a node
//! of the visible revision yield `Ok(None)` (or an empty list), never an
//! error; `Err` is reserved for backend failures and is propagated unchanged.

use thiserror::Error;

use crate::ids::{ContextToken, NodeId};
use crate::node::{CanonicalNode, ChildEntry};
use crate::value::PropertyValue;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("corrupt node {id}: {message}")]
    Corrupt { id: NodeId, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait CanonicalStore: Send + Sync {
    fn get_node(&self, id: NodeId, ctx: &ContextToken) -> Result<Option<CanonicalNode>, StoreError>;

    fn get_parent(&self, id: NodeId, ctx: &ContextToken) -> Result<Option<NodeId>, StoreError>;

    fn get_property(
        &self,
        id: NodeId,
        name: &str,
        ctx: &ContextToken,
    ) -> Result<Option<PropertyValue>, StoreError> {
        Ok(self
            .get_node(id, ctx)?
            .and_then(|mut node| node.properties.remove(name)))
    }

    fn get_children(&self, id: NodeId, ctx: &ContextToken) -> Result<Vec<ChildEntry>, StoreError> {
        Ok(self
            .get_node(id, ctx)?
            .map(|node| node.children)
            .unwrap_or_default())
    }

    /// Name under which `child` is registered below `parent`.
    fn get_child_entry(
        &self,
        parent: NodeId,
        child: NodeId,
        ctx: &ContextToken,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .get_children(parent, ctx)?
            .into_iter()
            .find(|entry| entry.id == child)
            .map(|entry| entry.name))
    }
}

impl<T: CanonicalStore + ?Sized> CanonicalStore for std::sync::Arc<T> {
    fn get_node(&self, id: NodeId, ctx: &ContextToken) -> Result<Option<CanonicalNode>, StoreError> {
        (**self).get_node(id, ctx)
    }

    fn get_parent(&self, id: NodeId, ctx: &ContextToken) -> Result<Option<NodeId>, StoreError> {
        (**self).get_parent(id, ctx)
    }

    fn get_property(
        &self,
        id: NodeId,
        name: &str,
        ctx: &ContextToken,
    ) -> Result<Option<PropertyValue>, StoreError> {
        (**self).get_property(id, name, ctx)
    }

    fn get_children(&self, id: NodeId, ctx: &ContextToken) -> Result<Vec<ChildEntry>, StoreError> {
        (**self).get_children(id, ctx)
    }

    fn get_child_entry(
        &self,
        parent: NodeId,
        child: NodeId,
        ctx: &ContextToken,
    ) -> Result<Option<String>, StoreError> {
        (**self).get_child_entry(parent, child, ctx)
    }
}
