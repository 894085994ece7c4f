//! Sample content for `facetview demo`.
//!
//! ```text
//! /content/news/<story>/<story>   documents in en/de plus a translation
//! /views/english                  facet select: one English variant
//! /views/red-first                facet select: red variants ranked first
//! /views/latest                   facet search: newest five stories
//! /views/again                    mirror of /views (cut when expanded)
//! ```

use anyhow::Result;

use facetview_model::names::{
    MIX_REFERENCEABLE, NT_DOCUMENT, NT_FACET_SEARCH, NT_FACET_SELECT, NT_FOLDER, NT_HANDLE,
    NT_MIRROR, NT_TRANSLATION, PROP_DOCBASE, PROP_FACETS, PROP_LIMIT, PROP_MODES, PROP_ORDER_BY,
    PROP_VALUES,
};
use facetview_model::{NodeId, PropertyValue, Value};
use facetview_store::{MemoryStore, ROOT_ID};

const STORIES: &[(&str, &str, i64)] = &[
    ("harbour-opens", "red", 20240105),
    ("river-cleanup", "blue", 20240212),
    ("market-day", "red", 20240301),
    ("night-train", "green", 20240418),
    ("new-library", "blue", 20240520),
    ("summer-fair", "red", 20240611),
];

pub fn sample_store() -> Result<MemoryStore> {
    let store = MemoryStore::new();
    let content = store.add_node(ROOT_ID, "content", NT_FOLDER)?;
    let news = store.add_node(content, "news", NT_FOLDER)?;

    for (name, color, date) in STORIES {
        let handle = store.add_node(news, name, NT_HANDLE)?;
        store.add_mixin(handle, MIX_REFERENCEABLE)?;
        for lang in ["en", "de"] {
            let doc = store.add_node(handle, name, NT_DOCUMENT)?;
            store.add_mixin(doc, MIX_REFERENCEABLE)?;
            store.set_property(doc, "content:lang", PropertyValue::single(lang))?;
            store.set_property(doc, "content:color", PropertyValue::single(*color))?;
            store.set_property(doc, "content:date", PropertyValue::single(Value::Long(*date)))?;
            store.set_property(doc, "content:title", PropertyValue::single(format!("{name} ({lang})")))?;
        }
        store.add_node(handle, name, NT_TRANSLATION)?;
    }

    let views = store.add_node(ROOT_ID, "views", NT_FOLDER)?;
    select(&store, views, "english", news, &[("content:lang", "en", "single")])?;
    select(&store, views, "red-first", news, &[("content:color", "red", "prefer")])?;

    let latest = store.add_node(views, "latest", NT_FACET_SEARCH)?;
    store.set_property(latest, PROP_DOCBASE, PropertyValue::single(news.to_string()))?;
    store.set_property(latest, PROP_ORDER_BY, PropertyValue::multi(["-content:date"]))?;
    store.set_property(latest, PROP_LIMIT, PropertyValue::single(Value::Long(5)))?;

    let again = store.add_node(views, "again", NT_MIRROR)?;
    store.set_property(again, PROP_DOCBASE, PropertyValue::single(views.to_string()))?;

    Ok(store)
}

fn select(
    store: &MemoryStore,
    parent: NodeId,
    name: &str,
    docbase: NodeId,
    rules: &[(&str, &str, &str)],
) -> Result<NodeId> {
    let id = store.add_node(parent, name, NT_FACET_SELECT)?;
    store.set_property(id, PROP_DOCBASE, PropertyValue::single(docbase.to_string()))?;
    store.set_property(id, PROP_FACETS, PropertyValue::multi(rules.iter().map(|r| r.0)))?;
    store.set_property(id, PROP_VALUES, PropertyValue::multi(rules.iter().map(|r| r.1)))?;
    store.set_property(id, PROP_MODES, PropertyValue::multi(rules.iter().map(|r| r.2)))?;
    Ok(id)
}
