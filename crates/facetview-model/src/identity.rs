//! Virtual node identities.
//!
//! An identity is the full key of a projected node: two identities are equal
//! (and hash equal) iff every field, including the whole parent chain, is
//! equal. Identities are immutable and shared behind `Arc`, so external
//! callers can use them directly as cache keys.

use std::fmt;
use std::sync::Arc;

use crate::criteria::Criteria;
use crate::facets::{OrderPreference, ViewFilter};
use crate::ids::{ContextToken, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualNodeIdentity {
    pub parent: Option<Arc<VirtualNodeIdentity>>,
    /// Name of the projected handle, set only on the handle's variant children.
    pub owning_name: Option<String>,
    pub canonical: NodeId,
    pub context: ContextToken,
    pub name: String,
    pub view: ViewFilter,
    pub order: Option<OrderPreference>,
    pub singled: bool,
}

impl VirtualNodeIdentity {
    pub fn root(
        canonical: NodeId,
        context: ContextToken,
        name: impl Into<String>,
        criteria: Criteria,
    ) -> Self {
        Self {
            parent: None,
            owning_name: None,
            canonical,
            context,
            name: name.into(),
            view: criteria.view,
            order: criteria.order,
            singled: criteria.singled,
        }
    }

    /// Child identity; the context token is inherited from the parent.
    pub fn child(
        parent: &Arc<VirtualNodeIdentity>,
        owning_name: Option<String>,
        canonical: NodeId,
        name: impl Into<String>,
        criteria: &Criteria,
    ) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            owning_name,
            canonical,
            context: parent.context.clone(),
            name: name.into(),
            view: criteria.view.clone(),
            order: criteria.order.clone(),
            singled: criteria.singled,
        }
    }

    pub fn criteria(&self) -> Criteria {
        Criteria::new(self.view.clone(), self.order.clone(), self.singled)
    }

    /// Number of ancestors above this identity.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &VirtualNodeIdentity> + '_ {
        std::iter::successors(self.parent.as_deref(), |p| p.parent.as_deref())
    }

    /// Slash-separated names from the root down to this identity.
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = self.ancestors().map(|a| a.name.as_str()).collect();
        names.reverse();
        names.push(&self.name);
        names.join("/")
    }
}

impl fmt::Display for VirtualNodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.path(), self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    fn criteria() -> Criteria {
        Criteria::new(
            [("color", "red")].into_iter().collect(),
            Some([("lang", "en")].into_iter().collect()),
            true,
        )
    }

    #[test]
    fn same_tuple_same_identity() {
        let ctx = ContextToken::new("req-1");
        let root_a = Arc::new(VirtualNodeIdentity::root(
            NodeId::from_u128(1),
            ctx.clone(),
            "root",
            Criteria::default(),
        ));
        let root_b = Arc::new(VirtualNodeIdentity::root(
            NodeId::from_u128(1),
            ctx,
            "root",
            Criteria::default(),
        ));
        let a = VirtualNodeIdentity::child(&root_a, None, NodeId::from_u128(2), "x", &criteria());
        let b = VirtualNodeIdentity::child(&root_b, None, NodeId::from_u128(2), "x", &criteria());

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn differing_singled_flag_differs() {
        let ctx = ContextToken::default();
        let mut c = criteria();
        let a = VirtualNodeIdentity::root(NodeId::from_u128(1), ctx.clone(), "n", c.clone());
        c.singled = false;
        let b = VirtualNodeIdentity::root(NodeId::from_u128(1), ctx, "n", c);
        assert_ne!(a, b);
    }

    #[test]
    fn preference_order_distinguishes_identities() {
        let ranked = |order: &[(&str, &str)]| {
            let criteria = Criteria::new(
                ViewFilter::new(),
                Some(order.iter().copied().collect()),
                false,
            );
            VirtualNodeIdentity::root(NodeId::from_u128(1), ContextToken::default(), "n", criteria)
        };
        let a = ranked(&[("lang", "en"), ("state", "live")]);
        let b = ranked(&[("state", "live"), ("lang", "en")]);
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.contains(&b));
    }

    #[test]
    fn path_and_depth_follow_parent_chain() {
        let root = Arc::new(VirtualNodeIdentity::root(
            NodeId::from_u128(1),
            ContextToken::default(),
            "root",
            Criteria::default(),
        ));
        let mid = Arc::new(VirtualNodeIdentity::child(
            &root,
            None,
            NodeId::from_u128(2),
            "mid",
            &Criteria::default(),
        ));
        let leaf =
            VirtualNodeIdentity::child(&mid, None, NodeId::from_u128(3), "leaf", &Criteria::default());
        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.path(), "root/mid/leaf");
    }
}
