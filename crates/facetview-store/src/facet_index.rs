//! FacetIndex: inverted index over property values.
//!
//! `facet -> value text -> {node ordinals}`, plus the set of nodes counting
//! as documents for search scoping. Multi-valued properties contribute one
//! posting per value.
//!
//! The index is cached per store generation and rebuilt lazily on the first
//! query after a mutation.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use roaring::RoaringBitmap;

use crate::memory::{MemoryStore, StoreState};

#[derive(Debug, Default, Clone)]
pub struct FacetIndex {
    postings: AHashMap<String, AHashMap<String, RoaringBitmap>>,
    documents: RoaringBitmap,
}

impl FacetIndex {
    pub(crate) fn build(state: &StoreState, document_types: &[String]) -> Self {
        let mut out = FacetIndex::default();
        for (ordinal, node) in state.live() {
            if node.has_any_tag(document_types) {
                out.documents.insert(ordinal);
            }
            for (name, value) in &node.properties {
                let by_value = out.postings.entry(name.clone()).or_default();
                for v in value.values() {
                    by_value
                        .entry(v.as_text().into_owned())
                        .or_insert_with(RoaringBitmap::new)
                        .insert(ordinal);
                }
            }
        }
        out
    }

    /// Nodes whose `facet` has `value` among its values.
    pub fn lookup(&self, facet: &str, value: &str) -> RoaringBitmap {
        self.postings
            .get(facet)
            .and_then(|by_value| by_value.get(value))
            .cloned()
            .unwrap_or_default()
    }

    /// Nodes carrying `facet` at all.
    pub fn with_facet(&self, facet: &str) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();
        if let Some(by_value) = self.postings.get(facet) {
            for bits in by_value.values() {
                out |= bits;
            }
        }
        out
    }

    pub fn documents(&self) -> &RoaringBitmap {
        &self.documents
    }

    pub fn facet_count(&self) -> usize {
        self.postings.len()
    }
}

#[derive(Debug, Default)]
pub(crate) struct FacetIndexCache {
    built: RwLock<Option<(u64, Arc<FacetIndex>)>>,
}

impl FacetIndexCache {
    pub(crate) fn get_or_build(&self, store: &MemoryStore, document_types: &[String]) -> Arc<FacetIndex> {
        let generation = store.generation();
        if let Some((built, index)) = self.built.read().as_ref() {
            if *built == generation {
                return Arc::clone(index);
            }
        }

        let mut guard = self.built.write();
        if let Some((built, index)) = guard.as_ref() {
            if *built == generation {
                return Arc::clone(index);
            }
        }
        let index = Arc::new(store.read(|state| FacetIndex::build(state, document_types)));
        tracing::debug!(
            generation,
            facets = index.facet_count(),
            documents = index.documents().len(),
            "rebuilt facet index"
        );
        *guard = Some((generation, Arc::clone(&index)));
        index
    }

    pub(crate) fn invalidate(&self) {
        *self.built.write() = None;
    }
}
