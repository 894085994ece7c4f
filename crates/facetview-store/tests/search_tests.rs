use std::sync::Arc;

use anyhow::Result;
use facetview_model::names::{NT_DOCUMENT, NT_FOLDER, NT_HANDLE};
use facetview_model::{
    ContextToken, FacetConstraint, FacetedQueryEngine, HitsRequested, NodeId, OrderBy,
    ParsedQuery, PropertyValue, RangeConstraint, SearchRequest, SearchResult, Value,
};
use facetview_store::{MemorySearchEngine, MemoryStore, ROOT_ID};

struct Fixture {
    store: Arc<MemoryStore>,
    base: NodeId,
    docs: Vec<NodeId>,
}

/// `/catalog/item-N/item-N` handles with one document each.
fn catalog(items: &[(&str, &str, i64)]) -> Result<Fixture> {
    let store = Arc::new(MemoryStore::new());
    let base = store.add_node(ROOT_ID, "catalog", NT_FOLDER)?;
    let mut docs = Vec::new();
    for (i, (color, lang, price)) in items.iter().enumerate() {
        let name = format!("item-{i}");
        let handle = store.add_node(base, &name, NT_HANDLE)?;
        let doc = store.add_node(handle, &name, NT_DOCUMENT)?;
        store.set_property(doc, "content:color", PropertyValue::single(*color))?;
        store.set_property(doc, "content:lang", PropertyValue::single(*lang))?;
        store.set_property(doc, "content:price", PropertyValue::single(Value::Long(*price)))?;
        docs.push(doc);
    }
    Ok(Fixture { store, base, docs })
}

fn run(
    engine: &MemorySearchEngine,
    query: &ParsedQuery,
    facets: &[FacetConstraint],
    ranges: &[RangeConstraint],
    ordering: &[OrderBy],
    limit: usize,
) -> Result<SearchResult> {
    let request = SearchRequest {
        query_name: "test",
        query,
        facets,
        ranges,
        external: None,
        ordering,
        inherited_filter: None,
        hits: HitsRequested {
            materialize: true,
            limit,
            offset: 0,
        },
    };
    Ok(engine.execute(&request, &ContextToken::default())?)
}

#[test]
fn parse_splits_docbase_and_inherited_filter() -> Result<()> {
    let engine = MemorySearchEngine::new(Arc::new(MemoryStore::new()));
    let q = engine.parse("abc#content:color=red&content:lang=en")?;
    assert_eq!(q.docbase, "abc");
    assert_eq!(
        q.filter,
        vec![
            FacetConstraint::new("content:color", "red"),
            FacetConstraint::new("content:lang", "en"),
        ]
    );

    let bare = engine.parse("abc")?;
    assert!(bare.filter.is_empty());

    assert!(engine.parse("#content:color=red").is_err());
    assert!(engine.parse("abc#no-equals-sign").is_err());
    Ok(())
}

#[test]
fn scope_is_limited_to_documents_below_the_docbase() -> Result<()> {
    let fx = catalog(&[("red", "en", 10), ("blue", "en", 20)])?;
    let outside = fx.store.add_node(ROOT_ID, "stray", NT_DOCUMENT)?;
    fx.store.set_property(outside, "content:color", PropertyValue::single("red"))?;

    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;
    let result = run(&engine, &query, &[], &[], &[], 100)?;

    assert_eq!(result.length, 2);
    assert_eq!(result.hits, fx.docs);
    Ok(())
}

#[test]
fn facet_constraints_and_inherited_filter_intersect() -> Result<()> {
    let fx = catalog(&[("red", "en", 10), ("red", "de", 20), ("blue", "en", 30)])?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));

    let query = engine.parse(&format!("{}#content:color=red", fx.base))?;
    let result = run(&engine, &query, &[FacetConstraint::new("content:lang", "en")], &[], &[], 100)?;
    assert_eq!(result.hits, vec![fx.docs[0]]);
    Ok(())
}

#[test]
fn ranges_compare_numbers_numerically() -> Result<()> {
    let fx = catalog(&[("red", "en", 5), ("red", "en", 50), ("red", "en", 500)])?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let ranges = [RangeConstraint::new("content:price", Some("10"), Some("100"))];
    let result = run(&engine, &query, &[], &ranges, &[], 100)?;
    assert_eq!(result.hits, vec![fx.docs[1]]);

    let open = [RangeConstraint::new("content:price", Some("50"), None)];
    let result = run(&engine, &query, &[], &open, &[], 100)?;
    assert_eq!(result.hits, vec![fx.docs[1], fx.docs[2]]);
    Ok(())
}

#[test]
fn ordering_is_stable_and_puts_missing_values_last() -> Result<()> {
    let fx = catalog(&[("b", "en", 3), ("a", "en", 1), ("b", "en", 2)])?;
    let unpriced = fx.store.add_node(fx.base, "unpriced", NT_DOCUMENT)?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let by_color = [OrderBy::ascending("content:color")];
    let result = run(&engine, &query, &[], &[], &by_color, 100)?;
    assert_eq!(result.hits, vec![fx.docs[1], fx.docs[0], fx.docs[2], unpriced]);

    let by_price_desc = [OrderBy::descending("content:price")];
    let result = run(&engine, &query, &[], &[], &by_price_desc, 100)?;
    assert_eq!(result.hits, vec![fx.docs[0], fx.docs[2], fx.docs[1], unpriced]);
    Ok(())
}

#[test]
fn limit_cuts_hits_but_not_length() -> Result<()> {
    let items: Vec<(&str, &str, i64)> = (0..25).map(|i| ("red", "en", i)).collect();
    let fx = catalog(&items)?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let result = run(&engine, &query, &[], &[], &[], 10)?;
    assert_eq!(result.length, 25);
    assert_eq!(result.hits, fx.docs[..10].to_vec());
    Ok(())
}

#[test]
fn index_follows_store_mutations() -> Result<()> {
    let fx = catalog(&[("red", "en", 1)])?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&format!("{}#content:color=blue", fx.base))?;
    assert_eq!(run(&engine, &query, &[], &[], &[], 10)?.length, 0);

    fx.store.set_property(fx.docs[0], "content:color", PropertyValue::single("blue"))?;
    assert_eq!(run(&engine, &query, &[], &[], &[], 10)?.hits, vec![fx.docs[0]]);
    Ok(())
}

#[test]
fn child_path_facets_are_matched_by_walking_names() -> Result<()> {
    let fx = catalog(&[("red", "en", 1), ("red", "en", 2)])?;
    let meta = fx.store.add_node(fx.docs[1], "meta", NT_FOLDER)?;
    fx.store.set_property(meta, "content:author", PropertyValue::single("ada"))?;

    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;
    let result = run(
        &engine,
        &query,
        &[FacetConstraint::new("meta/content:author", "ada")],
        &[],
        &[],
        10,
    )?;
    assert_eq!(result.hits, vec![fx.docs[1]]);
    Ok(())
}

#[test]
fn unknown_docbase_yields_an_empty_result() -> Result<()> {
    let engine = MemorySearchEngine::new(Arc::new(MemoryStore::new()));
    let query = engine.parse(&NodeId::from_u128(42).to_string())?;
    let result = run(&engine, &query, &[], &[], &[], 10)?;
    assert_eq!(result, SearchResult::default());

    let garbage = engine.parse("not-a-uuid")?;
    assert!(run(&engine, &garbage, &[], &[], &[], 10).is_err());
    Ok(())
}

#[test]
fn document_types_are_configurable() -> Result<()> {
    let fx = catalog(&[("red", "en", 1)])?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store)).with_document_types([NT_HANDLE]);
    let query = engine.parse(&fx.base.to_string())?;
    let result = run(&engine, &query, &[], &[], &[], 10)?;
    assert_eq!(result.length, 1);
    assert_ne!(result.hits, fx.docs);
    Ok(())
}

#[test]
fn wildcard_constraint_requires_the_facet_only() -> Result<()> {
    let fx = catalog(&[("red", "en", 1), ("blue", "de", 2)])?;
    let untagged = fx.store.add_node(fx.base, "untagged", NT_DOCUMENT)?;
    let meta = fx.store.add_node(fx.docs[1], "meta", NT_FOLDER)?;
    fx.store.set_property(meta, "content:author", PropertyValue::single("ada"))?;
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let any_color = [FacetConstraint::new("content:color", "*")];
    let result = run(&engine, &query, &any_color, &[], &[], 10)?;
    assert_eq!(result.hits, fx.docs);
    assert!(!result.hits.contains(&untagged));

    let any_author = [FacetConstraint::new("meta/content:author", "*")];
    let result = run(&engine, &query, &any_author, &[], &[], 10)?;
    assert_eq!(result.hits, vec![fx.docs[1]]);
    Ok(())
}

#[test]
fn keys_mixing_numbers_and_text_sort_as_text() -> Result<()> {
    let fx = catalog(&[("red", "en", 0), ("red", "en", 0), ("red", "en", 0), ("red", "en", 0)])?;
    for (doc, code) in fx.docs.iter().zip(["2", "10", "1a", "NaN"]) {
        fx.store.set_property(*doc, "content:code", PropertyValue::single(code))?;
    }
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let by_code = [OrderBy::ascending("content:code")];
    let result = run(&engine, &query, &[], &[], &by_code, 10)?;
    assert_eq!(result.hits, vec![fx.docs[1], fx.docs[2], fx.docs[0], fx.docs[3]]);

    // Every price is a number, so the same data sorts numerically by price.
    for (doc, price) in fx.docs.iter().zip([30, 4, 200, 1]) {
        fx.store.set_property(*doc, "content:price", PropertyValue::single(Value::Long(price)))?;
    }
    let by_price = [OrderBy::ascending("content:price")];
    let result = run(&engine, &query, &[], &[], &by_price, 10)?;
    assert_eq!(result.hits, vec![fx.docs[3], fx.docs[1], fx.docs[0], fx.docs[2]]);
    Ok(())
}

#[test]
fn numeric_ranges_skip_values_that_are_not_numbers() -> Result<()> {
    let fx = catalog(&[("red", "en", 0), ("red", "en", 0), ("red", "en", 0)])?;
    for (doc, code) in fx.docs.iter().zip(["5", "NaN", "abc"]) {
        fx.store.set_property(*doc, "content:code", PropertyValue::single(code))?;
    }
    let engine = MemorySearchEngine::new(Arc::clone(&fx.store));
    let query = engine.parse(&fx.base.to_string())?;

    let numeric = [RangeConstraint::new("content:code", Some("1"), Some("10"))];
    let result = run(&engine, &query, &[], &numeric, &[], 10)?;
    assert_eq!(result.hits, vec![fx.docs[0]]);

    let text = [RangeConstraint::new("content:code", Some("a"), Some("b"))];
    let result = run(&engine, &query, &[], &text, &[], 10)?;
    assert_eq!(result.hits, vec![fx.docs[2]]);
    Ok(())
}
