//! Recursion guard for dereferencing below an existing identity chain.
//!
//! The canonical store does not keep virtual chains acyclic: a facet select
//! inside a folder may point back at that folder. Every dereference made under
//! a parent identity is checked against the chain first.

use facetview_model::{NodeId, VirtualNodeIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    TooDeep { depth: usize },
    Cycle,
}

#[derive(Debug, Clone, Copy)]
pub struct RecursionGuard {
    max_depth: usize,
}

impl RecursionGuard {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check a dereference of `target` for a node placed below `parent`.
    pub fn check(&self, parent: Option<&VirtualNodeIdentity>, target: NodeId) -> GuardVerdict {
        let Some(parent) = parent else {
            return GuardVerdict::Allow;
        };
        let depth = parent.depth() + 1;
        if depth > self.max_depth {
            return GuardVerdict::TooDeep { depth };
        }
        let mut chain = std::iter::once(parent).chain(parent.ancestors());
        if chain.any(|identity| identity.canonical == target) {
            return GuardVerdict::Cycle;
        }
        GuardVerdict::Allow
    }
}
