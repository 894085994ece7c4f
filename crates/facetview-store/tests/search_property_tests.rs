use std::sync::Arc;

use facetview_model::names::{NT_DOCUMENT, NT_FOLDER};
use facetview_model::{
    ContextToken, FacetConstraint, FacetedQueryEngine, HitsRequested, OrderBy, PropertyValue,
    SearchRequest, SearchResult,
};
use facetview_store::{MemorySearchEngine, MemoryStore, ROOT_ID};
use proptest::prelude::*;

const MAX_DOCS: usize = 40;
const COLORS: [&str; 3] = ["red", "green", "blue"];

fn execute(
    engine: &MemorySearchEngine,
    raw: &str,
    facets: &[FacetConstraint],
    ordering: &[OrderBy],
    limit: usize,
) -> SearchResult {
    let query = engine.parse(raw).expect("parse");
    let request = SearchRequest {
        query_name: "prop",
        query: &query,
        facets,
        ranges: &[],
        external: None,
        ordering,
        inherited_filter: None,
        hits: HitsRequested {
            materialize: true,
            limit,
            offset: 0,
        },
    };
    engine
        .execute(&request, &ContextToken::default())
        .expect("execute")
}

proptest! {
    #[test]
    fn limited_hits_are_a_prefix_of_the_full_ordering(
        colors in prop::collection::vec(0usize..COLORS.len(), 0..=MAX_DOCS),
        limit in 0usize..=MAX_DOCS,
        filter_color in prop::option::of(0usize..COLORS.len()),
    ) {
        let store = Arc::new(MemoryStore::new());
        let base = store.add_node(ROOT_ID, "base", NT_FOLDER).unwrap();
        for (i, c) in colors.iter().enumerate() {
            let doc = store.add_node(base, &format!("d{i}"), NT_DOCUMENT).unwrap();
            store
                .set_property(doc, "content:color", PropertyValue::single(COLORS[*c]))
                .unwrap();
        }
        let engine = MemorySearchEngine::new(Arc::clone(&store));

        let facets: Vec<FacetConstraint> = filter_color
            .map(|c| FacetConstraint::new("content:color", COLORS[c]))
            .into_iter()
            .collect();
        let ordering = [OrderBy::ascending("content:color")];
        let raw = base.to_string();

        let full = execute(&engine, &raw, &facets, &ordering, MAX_DOCS);
        let cut = execute(&engine, &raw, &facets, &ordering, limit);

        let expected = match filter_color {
            Some(c) => colors.iter().filter(|x| **x == c).count(),
            None => colors.len(),
        };
        prop_assert_eq!(full.length as usize, expected);
        prop_assert_eq!(cut.length, full.length);
        prop_assert_eq!(cut.hits.len(), limit.min(expected));
        prop_assert_eq!(&full.hits[..cut.hits.len()], &cut.hits[..]);
    }
}
