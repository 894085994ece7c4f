//! Child projection: canonical children of a dereferenced node -> ordered
//! virtual child identities.
//!
//! Handles (containers of document variants) get the full treatment:
//!
//! - view filter on every ordinary or request child (absent facet matches)
//! - request children dropped in a singled view
//! - translation children set aside, appended last, and only when an ordinary
//!   child survived
//! - singled cutoff to one ordinary child, after ranking when an order
//!   preference exists, eagerly in canonical order otherwise
//!
//! Any other target projects every readable child unchanged. Dangling child
//! entries are skipped in both cases.

use std::sync::Arc;

use facetview_model::{
    CanonicalNode, CanonicalStore, ChildEntry, ContextToken, Criteria, VirtualNodeIdentity,
    ViewFilter,
};

use crate::config::NodeKinds;
use crate::error::Result;
use crate::ranking;

/// True if every constraining facet of the view is either absent from the
/// child or carries the required value among its values.
pub fn matches_view(node: &CanonicalNode, view: &ViewFilter) -> bool {
    view.constraining()
        .all(|(facet, required)| match node.property(facet) {
            Some(value) => value.contains_text(required),
            None => true,
        })
}

struct Candidate {
    entry: ChildEntry,
    node: CanonicalNode,
}

pub struct ChildProjector<'a> {
    store: &'a dyn CanonicalStore,
    kinds: &'a NodeKinds,
}

impl<'a> ChildProjector<'a> {
    pub fn new(store: &'a dyn CanonicalStore, kinds: &'a NodeKinds) -> Self {
        Self { store, kinds }
    }

    /// Child identities of `target` below `parent`, all carrying `criteria`.
    pub fn project(
        &self,
        target: &CanonicalNode,
        criteria: &Criteria,
        parent: &Arc<VirtualNodeIdentity>,
        ctx: &ContextToken,
    ) -> Result<Vec<Arc<VirtualNodeIdentity>>> {
        if !self.kinds.is_handle(target) {
            let mut out = Vec::with_capacity(target.children.len());
            for entry in &target.children {
                if self.readable(entry, ctx)?.is_none() {
                    continue;
                }
                out.push(Arc::new(VirtualNodeIdentity::child(
                    parent,
                    None,
                    entry.id,
                    entry.name.as_str(),
                    criteria,
                )));
            }
            return Ok(out);
        }

        let ranking = criteria.ranking();
        let eager_cutoff = criteria.singled && ranking.is_none();
        let mut kept: Vec<Candidate> = Vec::new();
        let mut translations: Vec<ChildEntry> = Vec::new();
        let mut ordinary = 0usize;

        for entry in &target.children {
            let Some(child) = self.readable(entry, ctx)? else {
                continue;
            };
            if self.kinds.is_translation(&child) {
                translations.push(entry.clone());
                continue;
            }
            if eager_cutoff && ordinary > 0 {
                continue;
            }
            let is_request = self.kinds.is_request(&child);
            if is_request && criteria.singled {
                continue;
            }
            if !matches_view(&child, &criteria.view) {
                continue;
            }
            if !is_request {
                ordinary += 1;
            }
            kept.push(Candidate {
                entry: entry.clone(),
                node: child,
            });
        }

        if let Some(order) = ranking {
            ranking::rank_by(&mut kept, order, |c| &c.node);
        }
        if criteria.singled {
            // Request children never reach here in a singled view.
            kept.truncate(1);
        }

        tracing::debug!(
            handle = %target.id,
            kept = kept.len(),
            translations = translations.len(),
            singled = criteria.singled,
            "projected handle variants"
        );

        let owning_name = parent.name.clone();
        let mut entries: Vec<ChildEntry> = kept.into_iter().map(|c| c.entry).collect();
        if ordinary > 0 {
            entries.extend(translations);
        }
        Ok(entries
            .into_iter()
            .map(|entry| {
                Arc::new(VirtualNodeIdentity::child(
                    parent,
                    Some(owning_name.clone()),
                    entry.id,
                    entry.name,
                    criteria,
                ))
            })
            .collect())
    }

    fn readable(&self, entry: &ChildEntry, ctx: &ContextToken) -> Result<Option<CanonicalNode>> {
        let node = self.store.get_node(entry.id, ctx)?;
        if node.is_none() {
            tracing::debug!(child = %entry.id, name = %entry.name, "skipping dangling child");
        }
        Ok(node)
    }
}
