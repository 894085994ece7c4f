//! MemorySearchEngine: a faceted query engine over `MemoryStore`.
//!
//! Query syntax: `<docbase>[#facet=value(&facet=value)*]`. The part after the
//! delimiter is the inherited filter.
//!
//! Semantics of `execute`:
//! - scope: document-kind descendants of the docbase (links followed once)
//! - facet constraints (query filter, explicit constraints, external query):
//!   exact match on any value, intersected through the facet index; a `*`
//!   value only requires the facet to be present; facet paths with `/` walk
//!   child names and are checked by scanning
//! - ranges: inclusive; numeric when every given bound is a finite number
//!   (values that are not numbers then fall outside), text otherwise
//! - ordering: order-by list, missing values last, stable on insertion order;
//!   a key sorts numerically only when every matched value of it is a
//!   finite number, as text otherwise
//! - `length` counts every match; `hits` is the offset/limit window

use std::cmp::Ordering;
use std::sync::Arc;

use roaring::RoaringBitmap;

use facetview_model::names::{NT_DOCUMENT, QUERY_DELIMITER};
use facetview_model::{
    CanonicalNode, ContextToken, FacetConstraint, FacetedQueryEngine, NodeId, OrderBy,
    ParsedQuery, QueryError, RangeConstraint, SearchRequest, SearchResult, ANY_VALUE,
};

use crate::facet_index::FacetIndexCache;
use crate::memory::{MemoryStore, StoreState};

pub struct MemorySearchEngine {
    store: Arc<MemoryStore>,
    document_types: Vec<String>,
    index: FacetIndexCache,
}

impl MemorySearchEngine {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            document_types: vec![NT_DOCUMENT.to_string()],
            index: FacetIndexCache::default(),
        }
    }

    /// Replace the node types (or mixins) that count as searchable documents.
    pub fn with_document_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_types = types.into_iter().map(Into::into).collect();
        self.index.invalidate();
        self
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

impl FacetedQueryEngine for MemorySearchEngine {
    fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        let parse_error = |message: String| QueryError::Parse {
            query: query.to_string(),
            message,
        };

        let (docbase, filter) = match query.split_once(QUERY_DELIMITER) {
            Some((docbase, filter)) => (docbase.trim(), Some(filter)),
            None => (query.trim(), None),
        };
        if docbase.is_empty() {
            return Err(parse_error("missing docbase".to_string()));
        }

        let filter = filter
            .unwrap_or_default()
            .split('&')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| c.parse::<FacetConstraint>().map_err(|e| parse_error(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParsedQuery {
            raw: query.to_string(),
            docbase: docbase.to_string(),
            filter,
        })
    }

    fn execute(
        &self,
        request: &SearchRequest<'_>,
        _ctx: &ContextToken,
    ) -> Result<SearchResult, QueryError> {
        let docbase = parse_docbase(request.query)?;
        let external_scope = request.external.map(parse_docbase).transpose()?;
        let index = self.index.get_or_build(&self.store, &self.document_types);

        let external_filter = request.external.map(|q| q.filter.as_slice()).unwrap_or(&[]);
        let constraints: Vec<&FacetConstraint> = request
            .query
            .filter
            .iter()
            .chain(request.facets)
            .chain(external_filter)
            .collect();

        let result = self.store.read(|state| {
            let mut candidates = descendants(state, docbase);
            candidates &= index.documents();
            if let Some(external) = external_scope {
                candidates &= descendants(state, external);
            }

            let mut scanned: Vec<&FacetConstraint> = Vec::new();
            for c in &constraints {
                if c.facet.contains('/') {
                    scanned.push(c);
                } else if c.value == ANY_VALUE {
                    candidates &= index.with_facet(&c.facet);
                } else {
                    candidates &= index.lookup(&c.facet, &c.value);
                }
            }

            let mut matches: Vec<&CanonicalNode> = candidates
                .iter()
                .filter_map(|ordinal| state.by_ordinal(ordinal))
                .filter(|node| {
                    scanned.iter().all(|c| {
                        values_at(state, node, &c.facet)
                            .iter()
                            .any(|v| c.value == ANY_VALUE || *v == c.value)
                    })
                })
                .filter(|node| request.ranges.iter().all(|r| in_range(state, node, r)))
                .collect();

            let length = matches.len() as u64;
            if !request.ordering.is_empty() {
                matches = ordered(state, matches, request.ordering);
            }

            let hits = if request.hits.materialize {
                matches
                    .into_iter()
                    .skip(request.hits.offset)
                    .take(request.hits.limit)
                    .map(|node| node.id)
                    .collect()
            } else {
                Vec::new()
            };
            SearchResult { length, hits }
        });

        tracing::debug!(
            query_name = request.query_name,
            query = %request.query.raw,
            length = result.length,
            returned = result.hits.len(),
            "executed faceted query"
        );
        Ok(result)
    }
}

fn parse_docbase(query: &ParsedQuery) -> Result<NodeId, QueryError> {
    NodeId::parse(&query.docbase).map_err(|e| QueryError::Parse {
        query: query.raw.clone(),
        message: e.to_string(),
    })
}

/// Ordinals of every node below `root` (not `root` itself).
fn descendants(state: &StoreState, root: NodeId) -> RoaringBitmap {
    let mut out = RoaringBitmap::new();
    let Some(node) = state.node(root) else {
        return out;
    };
    let mut stack: Vec<NodeId> = node.children.iter().rev().map(|c| c.id).collect();
    while let Some(id) = stack.pop() {
        let Some(ordinal) = state.ordinal(id) else {
            continue;
        };
        if !out.insert(ordinal) {
            continue;
        }
        if let Some(node) = state.by_ordinal(ordinal) {
            stack.extend(node.children.iter().rev().map(|c| c.id));
        }
    }
    out
}

/// Values of a facet, following `a/b/prop` through child names.
fn values_at(state: &StoreState, node: &CanonicalNode, facet: &str) -> Vec<String> {
    let mut parts: Vec<&str> = facet.split('/').collect();
    let Some(property) = parts.pop() else {
        return Vec::new();
    };
    let mut current = node;
    for name in parts {
        let Some(next) = current
            .children
            .iter()
            .filter(|c| c.name == name)
            .find_map(|c| state.node(c.id))
        else {
            return Vec::new();
        };
        current = next;
    }
    current.strings_property(property).unwrap_or_default()
}

fn number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// How the values of one sort key or one range compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collation {
    Numeric,
    Text,
}

impl Collation {
    /// Numeric only if every value parses as a finite number.
    fn of<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        if values.into_iter().all(|v| number(v).is_some()) {
            Collation::Numeric
        } else {
            Collation::Text
        }
    }

    /// `None` when a numeric collation meets a value that is not a number.
    fn compare(self, a: &str, b: &str) -> Option<Ordering> {
        match self {
            Collation::Numeric => Some(number(a)?.total_cmp(&number(b)?)),
            Collation::Text => Some(a.cmp(b)),
        }
    }
}

fn in_range(state: &StoreState, node: &CanonicalNode, range: &RangeConstraint) -> bool {
    let bounds = range.lower.iter().chain(&range.upper).map(String::as_str);
    let collation = Collation::of(bounds);
    values_at(state, node, &range.facet).iter().any(|v| {
        let above = range.lower.as_deref().map_or(true, |lo| {
            matches!(collation.compare(v, lo), Some(Ordering::Greater | Ordering::Equal))
        });
        let below = range.upper.as_deref().map_or(true, |hi| {
            matches!(collation.compare(v, hi), Some(Ordering::Less | Ordering::Equal))
        });
        above && below
    })
}

/// Sort matches by the order-by list. Each key's first value is read once
/// and each key gets a single collation, so the comparison is a total order.
fn ordered<'s>(
    state: &'s StoreState,
    matches: Vec<&'s CanonicalNode>,
    ordering: &[OrderBy],
) -> Vec<&'s CanonicalNode> {
    let mut keyed: Vec<(Vec<Option<String>>, &CanonicalNode)> = matches
        .into_iter()
        .map(|node| {
            let keys = ordering
                .iter()
                .map(|o| values_at(state, node, &o.facet).into_iter().next())
                .collect();
            (keys, node)
        })
        .collect();
    let collations: Vec<Collation> = (0..ordering.len())
        .map(|i| Collation::of(keyed.iter().filter_map(|(keys, _)| keys[i].as_deref())))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, ordering, &collations));
    keyed.into_iter().map(|(_, node)| node).collect()
}

fn compare_keys(
    a: &[Option<String>],
    b: &[Option<String>],
    ordering: &[OrderBy],
    collations: &[Collation],
) -> Ordering {
    for ((order, collation), (va, vb)) in ordering.iter().zip(collations).zip(a.iter().zip(b)) {
        let cmp = match (va, vb) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(x), Some(y)) => {
                let c = collation.compare(x, y).unwrap_or_else(|| x.cmp(y));
                if order.descending {
                    c.reverse()
                } else {
                    c
                }
            }
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}
