//! Reference resolution: stored reference string -> canonical target.

use facetview_model::{CanonicalNode, CanonicalStore, ContextToken, EmptyReason, NodeId};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Target(CanonicalNode),
    /// Empty, sentinel, or pointing at nothing visible.
    NoTarget,
    /// Not an identifier at all.
    Invalid,
}

impl Resolution {
    pub fn target(self) -> Option<CanonicalNode> {
        match self {
            Resolution::Target(node) => Some(node),
            _ => None,
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Resolution::Target(_) => None,
            Resolution::NoTarget => Some(EmptyReason::NoTarget),
            Resolution::Invalid => Some(EmptyReason::InvalidReference),
        }
    }
}

pub struct ReferenceResolver<'a> {
    store: &'a dyn CanonicalStore,
    sentinel_suffix: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn CanonicalStore, sentinel_suffix: &'a str) -> Self {
        Self {
            store,
            sentinel_suffix,
        }
    }

    /// True for references into system areas.
    pub fn is_sentinel(&self, reference: &str) -> bool {
        !self.sentinel_suffix.is_empty()
            && reference
                .to_ascii_lowercase()
                .ends_with(&self.sentinel_suffix.to_ascii_lowercase())
    }

    /// Only store failures are errors; everything else is a soft outcome.
    pub fn resolve(&self, reference: Option<&str>, ctx: &ContextToken) -> Result<Resolution> {
        let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Resolution::NoTarget);
        };
        if self.is_sentinel(reference) {
            tracing::debug!(reference, "reference points into a system area");
            return Ok(Resolution::NoTarget);
        }
        let id = match NodeId::parse(reference) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(reference, error = %err, "invalid reference");
                return Ok(Resolution::Invalid);
            }
        };
        Ok(match self.store.get_node(id, ctx)? {
            Some(node) => Resolution::Target(node),
            None => {
                tracing::debug!(%id, "reference target not found");
                Resolution::NoTarget
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetview_model::names::{NT_FOLDER, SYSTEM_SENTINEL_SUFFIX};
    use facetview_store::{MemoryStore, ROOT_ID};

    fn resolve(store: &MemoryStore, reference: Option<&str>) -> Resolution {
        ReferenceResolver::new(store, SYSTEM_SENTINEL_SUFFIX)
            .resolve(reference, &ContextToken::default())
            .unwrap()
    }

    #[test]
    fn empty_and_absent_references_have_no_target() {
        let store = MemoryStore::new();
        assert_eq!(resolve(&store, None), Resolution::NoTarget);
        assert_eq!(resolve(&store, Some("")), Resolution::NoTarget);
        assert_eq!(resolve(&store, Some("   ")), Resolution::NoTarget);
    }

    #[test]
    fn sentinel_references_are_never_dereferenced() {
        let store = MemoryStore::new();
        let root = ROOT_ID.to_string();
        assert_eq!(resolve(&store, Some(&root)), Resolution::NoTarget);
        assert_eq!(resolve(&store, Some(&root.to_uppercase())), Resolution::NoTarget);
    }

    #[test]
    fn malformed_reference_is_invalid() {
        let store = MemoryStore::new();
        let r = resolve(&store, Some("not-a-uuid"));
        assert_eq!(r, Resolution::Invalid);
        assert_eq!(r.empty_reason(), Some(EmptyReason::InvalidReference));
    }

    #[test]
    fn existing_and_missing_targets() {
        let store = MemoryStore::new();
        let id = store.add_node(ROOT_ID, "a", NT_FOLDER).unwrap();
        let found = resolve(&store, Some(&id.to_string())).target().unwrap();
        assert_eq!(found.id, id);

        let missing = NodeId::from_u128(7).to_string();
        assert_eq!(resolve(&store, Some(&missing)), Resolution::NoTarget);
    }
}
