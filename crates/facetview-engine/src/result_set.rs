//! Faceted result sets: a compiled query whose hits become mirror children.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use facetview_model::names::{
    NT_FACET_RESULT, PROP_CONSTRAINTS, PROP_COUNT, PROP_DOCBASE, PROP_LIMIT, PROP_ORDER_BY,
    PROP_PRIMARY_TYPE, PROP_QUERY_NAME, PROP_RANGES, PROP_SEARCH,
};
use facetview_model::{
    CanonicalNode, CanonicalStore, ContextToken, Criteria, FacetConstraint, FacetPath, FacetedQueryEngine,
    HitsRequested, ModelError, OrderBy, Population, PropertyValue, RangeConstraint,
    SearchRequest, Value, VirtualNode, VirtualNodeIdentity, VirtualResultSet,
};

use crate::config::EngineConfig;
use crate::error::Result;

/// Everything a faceted result set is computed from.
#[derive(Debug, Clone, Default)]
pub struct ResultSetRequest {
    pub query_name: String,
    /// Name of the result node; defaults to the query name.
    pub name: Option<String>,
    pub parent: Option<Arc<VirtualNodeIdentity>>,
    /// Criteria carried by the result node and every hit.
    pub ancestor: Option<Criteria>,
    pub docbase: String,
    pub inherited_filter: Option<String>,
    pub facets: Vec<FacetConstraint>,
    pub ranges: Vec<RangeConstraint>,
    pub order_by: Vec<OrderBy>,
    /// Falls back to the configured default limit.
    pub limit: Option<usize>,
}

impl ResultSetRequest {
    pub fn new(query_name: impl Into<String>, docbase: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            docbase: docbase.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn under(mut self, parent: Arc<VirtualNodeIdentity>, ancestor: Criteria) -> Self {
        self.parent = Some(parent);
        self.ancestor = Some(ancestor);
        self
    }

    pub fn with_inherited_filter(mut self, filter: impl Into<String>) -> Self {
        self.inherited_filter = Some(filter.into());
        self
    }

    pub fn with_facet(mut self, constraint: FacetConstraint) -> Self {
        self.facets.push(constraint);
        self
    }

    pub fn with_range(mut self, range: RangeConstraint) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Read a result set declared on a stored facet-search node.
    pub fn from_provider(node: &CanonicalNode, name: &str) -> std::result::Result<Self, ModelError> {
        let list = |prop: &str| -> Vec<String> {
            node.strings_property(prop)
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let limit = match node.property(PROP_LIMIT).and_then(PropertyValue::first) {
            None => None,
            Some(value) => {
                let parsed = match value.as_long() {
                    Some(n) => usize::try_from(n).ok(),
                    None => value.as_text().trim().parse::<usize>().ok(),
                };
                match parsed {
                    Some(n) if n > 0 => Some(n),
                    _ => {
                        return Err(ModelError::InvalidConstraint(format!(
                            "{PROP_LIMIT}={}",
                            value.as_text()
                        )))
                    }
                }
            }
        };
        let search = list(PROP_SEARCH);

        Ok(Self {
            query_name: node
                .string_property(PROP_QUERY_NAME)
                .unwrap_or_else(|| name.to_string()),
            name: Some(name.to_string()),
            parent: None,
            ancestor: None,
            docbase: node.string_property(PROP_DOCBASE).unwrap_or_default(),
            inherited_filter: (!search.is_empty()).then(|| search.join("&")),
            facets: list(PROP_CONSTRAINTS)
                .iter()
                .map(|s| s.parse())
                .collect::<std::result::Result<_, _>>()?,
            ranges: list(PROP_RANGES)
                .iter()
                .map(|s| s.parse())
                .collect::<std::result::Result<_, _>>()?,
            order_by: list(PROP_ORDER_BY)
                .iter()
                .map(|s| s.parse())
                .collect::<std::result::Result<_, _>>()?,
            limit,
        })
    }

    pub fn node_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.query_name)
    }

    /// Every facet path the request mentions, in request order.
    pub fn facet_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.facets
            .iter()
            .map(|c| c.facet.as_str())
            .chain(self.ranges.iter().map(|r| r.facet.as_str()))
            .chain(self.order_by.iter().map(|o| o.facet.as_str()))
    }

    /// `docbase[<delimiter>inherited_filter]`, the string handed to the parser.
    pub fn query_string(&self, delimiter: &str) -> String {
        match self.inherited_filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => {
                format!("{}{delimiter}{filter}", self.docbase.trim())
            }
            _ => self.docbase.trim().to_string(),
        }
    }
}

/// Why a facet path was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetPathError {
    #[error(transparent)]
    Malformed(#[from] ModelError),

    #[error("unknown namespace prefix `{prefix}` in facet path `{path}`")]
    UnknownNamespace { path: String, prefix: String },
}

/// A facet path is valid when it parses into qualified names and every prefix
/// it uses is a configured namespace.
pub fn validate_facet_path(path: &str, config: &EngineConfig) -> std::result::Result<FacetPath, FacetPathError> {
    let parsed: FacetPath = path.parse().map_err(FacetPathError::Malformed)?;
    if let Some(prefix) = parsed.prefixes().find(|p| !config.is_known_namespace(p)) {
        return Err(FacetPathError::UnknownNamespace {
            path: path.to_string(),
            prefix: prefix.to_string(),
        });
    }
    Ok(parsed)
}

pub struct ResultSetProjector<'a> {
    store: &'a dyn CanonicalStore,
    search: &'a dyn FacetedQueryEngine,
    config: &'a EngineConfig,
}

impl<'a> ResultSetProjector<'a> {
    pub fn new(
        store: &'a dyn CanonicalStore,
        search: &'a dyn FacetedQueryEngine,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            store,
            search,
            config,
        }
    }

    /// Run the query and turn hits into children of `identity`.
    ///
    /// Hits keep the engine's order. A hit whose parent or child entry cannot
    /// be read is skipped.
    pub fn project(
        &self,
        request: &ResultSetRequest,
        identity: Arc<VirtualNodeIdentity>,
        ctx: &ContextToken,
    ) -> Result<VirtualResultSet> {
        let query = self
            .search
            .parse(&request.query_string(&self.config.query_delimiter))?;
        let limit = request.limit.unwrap_or(self.config.default_limit);
        let search_request = SearchRequest {
            query_name: &request.query_name,
            query: &query,
            facets: &request.facets,
            ranges: &request.ranges,
            external: None,
            ordering: &request.order_by,
            inherited_filter: request.inherited_filter.as_deref(),
            hits: HitsRequested {
                materialize: true,
                limit,
                offset: 0,
            },
        };
        let result = self.search.execute(&search_request, ctx)?;

        let criteria = identity.criteria();
        let mut children = Vec::with_capacity(result.hits.len());
        for hit in result.iter() {
            let Some(parent) = self.store.get_parent(hit, ctx)? else {
                tracing::debug!(%hit, "skipping hit without parent");
                continue;
            };
            let Some(name) = self.store.get_child_entry(parent, hit, ctx)? else {
                tracing::debug!(%hit, %parent, "skipping hit without child entry");
                continue;
            };
            children.push(Arc::new(VirtualNodeIdentity::child(
                &identity, None, hit, name, &criteria,
            )));
        }

        tracing::debug!(
            query_name = %request.query_name,
            count = result.length,
            children = children.len(),
            limit,
            "projected result set"
        );

        let mut properties = BTreeMap::new();
        properties.insert(
            PROP_PRIMARY_TYPE.to_string(),
            PropertyValue::single(NT_FACET_RESULT),
        );
        properties.insert(
            PROP_COUNT.to_string(),
            PropertyValue::single(Value::Long(i64::try_from(result.length).unwrap_or(i64::MAX))),
        );

        Ok(VirtualResultSet {
            count: result.length,
            node: VirtualNode {
                name: identity.name.clone(),
                identity: Some(identity),
                node_type: Some(NT_FACET_RESULT.to_string()),
                mixins: Default::default(),
                properties,
                children,
                population: Population::Populated,
            },
        })
    }
}
