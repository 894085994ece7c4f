//! Criteria compilation: ancestor criteria + declared facet rules.

use facetview_model::names::{PROP_FACETS, PROP_MODES, PROP_VALUES};
use facetview_model::{
    CanonicalNode, Criteria, CriteriaTriple, FacetMode, ModelError, OrderPreference,
};

/// Apply `triples` in declaration order on top of the ancestor criteria.
///
/// The order preference stays `None` unless the ancestor had one or a
/// `prefer`/`prefer-single` rule creates it. The ancestor's maps are shared,
/// never modified.
pub fn compile(ancestor: Option<&Criteria>, triples: &[CriteriaTriple]) -> Criteria {
    let Criteria {
        mut view,
        mut order,
        mut singled,
    } = ancestor.cloned().unwrap_or_default();

    for triple in triples {
        let facet = triple.facet.as_str();
        let value = triple.value.as_str();
        match triple.mode {
            FacetMode::Stick | FacetMode::Select => view.insert(facet, value),
            FacetMode::Single => {
                view.insert(facet, value);
                singled = true;
            }
            FacetMode::Prefer => order.get_or_insert_with(OrderPreference::new).insert(facet, value),
            FacetMode::PreferSingle => {
                order.get_or_insert_with(OrderPreference::new).insert(facet, value);
                singled = true;
            }
            FacetMode::Clear => {
                view.remove(facet);
            }
        }
    }

    Criteria::new(view, order, singled)
}

/// Triples stored on a facet-select node as three parallel properties.
///
/// A node declaring none of the three properties declares no rules.
pub fn declared_triples(node: &CanonicalNode) -> Result<Vec<CriteriaTriple>, ModelError> {
    let facets = node.strings_property(PROP_FACETS).unwrap_or_default();
    let values = node.strings_property(PROP_VALUES).unwrap_or_default();
    let modes = node.strings_property(PROP_MODES).unwrap_or_default();
    CriteriaTriple::zip(&facets, &values, &modes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetview_model::names::NT_FACET_SELECT;
    use facetview_model::{NodeId, PropertyValue, Value, ViewFilter};
    use proptest::prelude::*;

    fn t(facet: &str, value: &str, mode: FacetMode) -> CriteriaTriple {
        CriteriaTriple::new(facet, value, mode)
    }

    #[test]
    fn stick_and_single_fill_the_view() {
        let c = compile(
            None,
            &[t("color", "red", FacetMode::Stick), t("lang", "en", FacetMode::Single)],
        );
        assert_eq!(c.view.get("color"), Some("red"));
        assert_eq!(c.view.get("lang"), Some("en"));
        assert!(c.singled);
        assert!(c.order.is_none());
    }

    #[test]
    fn later_rules_override_in_place() {
        let c = compile(
            None,
            &[
                t("color", "red", FacetMode::Select),
                t("size", "m", FacetMode::Select),
                t("color", "blue", FacetMode::Stick),
            ],
        );
        let entries: Vec<_> = c.view.iter().collect();
        assert_eq!(entries, vec![("color", "blue"), ("size", "m")]);
    }

    #[test]
    fn prefer_creates_order_lazily() {
        let c = compile(None, &[t("lang", "de", FacetMode::Prefer)]);
        assert_eq!(c.order.as_ref().and_then(|o| o.get("lang")), Some("de"));
        assert!(!c.singled);

        let c = compile(None, &[t("lang", "de", FacetMode::PreferSingle)]);
        assert!(c.singled);
        assert!(c.view.is_empty());
    }

    #[test]
    fn inherits_and_leaves_ancestor_untouched() {
        let ancestor = Criteria::new(
            [("color", "red")].into_iter().collect(),
            Some([("lang", "en")].into_iter().collect()),
            true,
        );
        let c = compile(Some(&ancestor), &[t("size", "l", FacetMode::Stick)]);
        assert_eq!(c.view.get("color"), Some("red"));
        assert_eq!(c.view.get("size"), Some("l"));
        assert!(c.singled);
        assert!(!ancestor.view.contains("size"));
    }

    #[test]
    fn clear_removes_inherited_facet() {
        let ancestor = Criteria::new([("color", "red")].into_iter().collect(), None, false);
        let c = compile(Some(&ancestor), &[t("color", "", FacetMode::Clear)]);
        assert!(c.view.is_empty());
    }

    #[test]
    fn declared_triples_read_parallel_arrays() {
        let mut node = CanonicalNode::new(NodeId::from_u128(1), NT_FACET_SELECT);
        node.properties.insert(
            PROP_FACETS.into(),
            PropertyValue::multi([Value::from("color"), Value::from("lang")]),
        );
        node.properties.insert(
            PROP_VALUES.into(),
            PropertyValue::multi([Value::from("red"), Value::from("en")]),
        );
        node.properties.insert(
            PROP_MODES.into(),
            PropertyValue::multi([Value::from("stick"), Value::from("prefer")]),
        );
        let triples = declared_triples(&node).unwrap();
        assert_eq!(triples[1], t("lang", "en", FacetMode::Prefer));

        node.properties
            .insert(PROP_MODES.into(), PropertyValue::multi([Value::from("stick")]));
        assert!(declared_triples(&node).is_err());

        let bare = CanonicalNode::new(NodeId::from_u128(2), NT_FACET_SELECT);
        assert!(declared_triples(&bare).unwrap().is_empty());
    }

    fn other_facet_triple() -> impl Strategy<Value = CriteriaTriple> {
        (
            prop::sample::select(vec!["size", "lang", "brand"]),
            prop::sample::select(vec!["", "*", "a", "b"]),
            prop::sample::select(FacetMode::ALL.to_vec()),
        )
            .prop_map(|(f, v, m)| CriteriaTriple::new(f, v, m))
    }

    proptest! {
        #[test]
        fn clear_wins_wherever_it_sits_among_other_facets(
            others in prop::collection::vec(other_facet_triple(), 0..8),
            position in 0usize..9,
        ) {
            let ancestor = Criteria::new(
                ViewFilter::from_iter([("color", "red")]),
                None,
                false,
            );
            let mut triples = others.clone();
            let at = position.min(triples.len());
            triples.insert(at, t("color", "", FacetMode::Clear));

            let compiled = compile(Some(&ancestor), &triples);
            prop_assert!(!compiled.view.contains("color"));

            let without_clear = compile(Some(&ancestor), &others);
            for (facet, value) in without_clear.view.iter().filter(|(f, _)| *f != "color") {
                prop_assert_eq!(compiled.view.get(facet), Some(value));
            }
        }
    }
}
