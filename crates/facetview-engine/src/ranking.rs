//! Ranking of handle variants by order preference.
//!
//! For each preferred facet, in declaration order, a child whose value
//! matches sorts before one whose value does not. The first facet on which
//! two children differ decides; full ties keep canonical order.

use std::cmp::Ordering;

use facetview_model::{CanonicalNode, OrderPreference, ANY_VALUE};

/// True if the child carries the preferred value for `facet`.
///
/// An empty or `*` preference is satisfied by any value, but the facet has to
/// be present.
pub fn prefers(node: &CanonicalNode, facet: &str, preferred: &str) -> bool {
    match node.property(facet) {
        Some(_) if preferred.is_empty() || preferred == ANY_VALUE => true,
        Some(value) => value.contains_text(preferred),
        None => false,
    }
}

/// Sort key: one "missed" flag per preferred facet (`false` sorts first).
fn misses(node: &CanonicalNode, order: &OrderPreference) -> Vec<bool> {
    order
        .iter()
        .map(|(facet, preferred)| !prefers(node, facet, preferred))
        .collect()
}

pub fn compare(a: &CanonicalNode, b: &CanonicalNode, order: &OrderPreference) -> Ordering {
    for (facet, preferred) in order.iter() {
        match (prefers(a, facet, preferred), prefers(b, facet, preferred)) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Stable in-place ranking of `items` by the node each one refers to.
pub fn rank_by<T>(items: &mut [T], order: &OrderPreference, node_of: impl Fn(&T) -> &CanonicalNode) {
    if order.is_empty() {
        return;
    }
    items.sort_by_cached_key(|item| misses(node_of(item), order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetview_model::names::NT_DOCUMENT;
    use facetview_model::{NodeId, PropertyValue};
    use proptest::prelude::*;

    fn doc(n: u128, props: &[(&str, &str)]) -> CanonicalNode {
        let mut node = CanonicalNode::new(NodeId::from_u128(n), NT_DOCUMENT);
        for (k, v) in props {
            node.properties.insert(k.to_string(), PropertyValue::single(*v));
        }
        node
    }

    fn ids(nodes: &[CanonicalNode]) -> Vec<u128> {
        nodes.iter().map(|n| n.id.as_uuid().as_u128()).collect()
    }

    #[test]
    fn first_differing_facet_decides() {
        let order: OrderPreference = [("lang", "en"), ("state", "live")].into_iter().collect();
        let mut nodes = vec![
            doc(1, &[("lang", "de"), ("state", "live")]),
            doc(2, &[("lang", "en"), ("state", "draft")]),
            doc(3, &[("lang", "en"), ("state", "live")]),
        ];
        rank_by(&mut nodes, &order, |n| n);
        assert_eq!(ids(&nodes), vec![3, 2, 1]);
        assert_eq!(compare(&nodes[0], &nodes[1], &order), Ordering::Less);
    }

    #[test]
    fn full_ties_keep_canonical_order() {
        let order: OrderPreference = [("lang", "en")].into_iter().collect();
        let mut nodes = vec![
            doc(1, &[("lang", "de")]),
            doc(2, &[("lang", "fr")]),
            doc(3, &[("lang", "en")]),
            doc(4, &[]),
        ];
        rank_by(&mut nodes, &order, |n| n);
        assert_eq!(ids(&nodes), vec![3, 1, 2, 4]);
    }

    #[test]
    fn wildcard_preference_needs_the_facet() {
        let with = doc(1, &[("lang", "xx")]);
        let without = doc(2, &[]);
        assert!(prefers(&with, "lang", "*"));
        assert!(!prefers(&without, "lang", "*"));
    }

    const LANGS: [&str; 3] = ["en", "de", "fr"];
    const STATES: [&str; 2] = ["live", "draft"];

    proptest! {
        #[test]
        fn ranking_is_sorted_and_stable(
            specs in prop::collection::vec((0usize..4, 0usize..3), 0..24),
        ) {
            let nodes: Vec<CanonicalNode> = specs
                .iter()
                .enumerate()
                .map(|(i, (l, s))| {
                    let mut props = Vec::new();
                    if *l < LANGS.len() {
                        props.push(("lang", LANGS[*l]));
                    }
                    if *s < STATES.len() {
                        props.push(("state", STATES[*s]));
                    }
                    doc(i as u128, &props)
                })
                .collect();
            let order: OrderPreference = [("lang", "en"), ("state", "live")].into_iter().collect();

            let mut ranked = nodes.clone();
            rank_by(&mut ranked, &order, |n| n);

            prop_assert_eq!(ranked.len(), nodes.len());
            for pair in ranked.windows(2) {
                let cmp = compare(&pair[0], &pair[1], &order);
                prop_assert_ne!(cmp, Ordering::Greater);
                if cmp == Ordering::Equal {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }

            let mut again = nodes.clone();
            rank_by(&mut again, &order, |n| n);
            prop_assert_eq!(ids(&ranked), ids(&again));
        }
    }
}
