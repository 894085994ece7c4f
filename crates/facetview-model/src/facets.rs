//! Persistent ordered facet maps.
//!
//! `ViewFilter` (hard constraints) and `OrderPreference` (ranking hints) are
//! both ordered `facet -> value` maps:
//!
//! - insertion order is preserved and drives ranking precedence
//! - inserting an existing facet replaces its value in place
//! - storage is shared copy-on-write, so a child identity holding an
//!   ancestor's map never observes a later edit made by a sibling projection
//!
//! `FacetMap` and `OrderPreference` compare entry by entry, in order: the
//! same preferences declared in a different order rank differently. A
//! `ViewFilter` is a conjunction, so it compares as an unordered map.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Filter value meaning "any value is acceptable".
pub const ANY_VALUE: &str = "*";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetMap {
    entries: Arc<Vec<(String, String)>>,
}

impl FacetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, facet: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == facet)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, facet: &str) -> bool {
        self.get(facet).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Insert or replace; a replaced facet keeps its position.
    pub fn insert(&mut self, facet: impl Into<String>, value: impl Into<String>) {
        let facet = facet.into();
        let value = value.into();
        let entries = Arc::make_mut(&mut self.entries);
        if let Some(slot) = entries.iter_mut().find(|(f, _)| *f == facet) {
            slot.1 = value;
        } else {
            entries.push((facet, value));
        }
    }

    pub fn remove(&mut self, facet: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(f, _)| f == facet)?;
        let entries = Arc::make_mut(&mut self.entries);
        Some(entries.remove(pos).1)
    }

    /// True if both maps still share the same backing storage.
    pub fn shares_storage_with(&self, other: &FacetMap) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    fn sorted(&self) -> Vec<&(String, String)> {
        let mut sorted: Vec<&(String, String)> = self.entries.iter().collect();
        sorted.sort();
        sorted
    }
}

impl PartialEq for FacetMap {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage_with(other) || self.entries == other.entries
    }
}

impl Eq for FacetMap {}

impl Hash for FacetMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FacetMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = FacetMap::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

macro_rules! facet_map_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(FacetMap);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn into_inner(self) -> FacetMap {
                self.0
            }
        }

        impl Deref for $name {
            type Target = FacetMap;

            fn deref(&self) -> &FacetMap {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut FacetMap {
                &mut self.0
            }
        }

        impl From<FacetMap> for $name {
            fn from(map: FacetMap) -> Self {
                Self(map)
            }
        }

        impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

facet_map_newtype!(
    /// Exact-match constraints applied to handle variants.
    ViewFilter
);

facet_map_newtype!(
    /// Preferred facet values used only to rank handle variants.
    #[derive(PartialEq, Eq, Hash)]
    OrderPreference
);

impl PartialEq for ViewFilter {
    fn eq(&self, other: &Self) -> bool {
        if self.shares_storage_with(other) {
            return true;
        }
        self.len() == other.len() && self.iter().all(|(f, v)| other.get(f) == Some(v))
    }
}

impl Eq for ViewFilter {}

impl Hash for ViewFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (f, v) in self.sorted() {
            f.hash(state);
            v.hash(state);
        }
    }
}

impl ViewFilter {
    /// Facets whose value actually constrains a child (not empty, not `*`).
    pub fn constraining(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.iter()
            .filter(|(_, v)| !v.is_empty() && *v != ANY_VALUE)
    }
}
