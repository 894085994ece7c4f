//! ProjectionEngine: the entry points of virtual view projection.
//!
//! ```text
//! project_mirror ─────┐                     ┌─► ChildProjector ─► ranking
//!                     ├─► ReferenceResolver ┤
//! project_result_set ─┘   RecursionGuard    └─► MirrorAssembler / ResultSetProjector
//!
//! project_node / expand ─► StrategyTable ─► one of the two entry points above
//! ```
//!
//! Soft failures (bad references, malformed rules, self-reference, unknown
//! facet paths, recursion) come back as unpopulated nodes with an
//! `EmptyReason`. Store and query failures are returned as errors.

use std::sync::Arc;

use facetview_model::names::PROP_DOCBASE;
use facetview_model::{
    CanonicalNode, CanonicalStore, ContextToken, Criteria, CriteriaTriple, EmptyReason,
    FacetedQueryEngine, NodeId, VirtualNode, VirtualNodeIdentity, VirtualResultSet,
};

use crate::config::EngineConfig;
use crate::criteria::{compile, declared_triples};
use crate::error::Result;
use crate::guard::{GuardVerdict, RecursionGuard};
use crate::mirror::MirrorAssembler;
use crate::projector::ChildProjector;
use crate::resolver::{ReferenceResolver, Resolution};
use crate::result_set::{validate_facet_path, ResultSetProjector, ResultSetRequest};
use crate::strategy::{ProjectorKind, StrategyTable};

// ============================================================================
// Requests
// ============================================================================

/// A single dereference: plain mirror without `criteria`, facet select with.
#[derive(Debug, Clone, Default)]
pub struct MirrorRequest {
    /// Stored reference (docbase) to dereference.
    pub reference: Option<String>,
    pub name: String,
    pub parent: Option<Arc<VirtualNodeIdentity>>,
    pub owning_name: Option<String>,
    /// Criteria inherited from the enclosing view.
    pub ancestor: Option<Criteria>,
    /// Facet rules declared at this node.
    pub criteria: Option<Vec<CriteriaTriple>>,
}

impl MirrorRequest {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent: Arc<VirtualNodeIdentity>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_ancestor(mut self, ancestor: Criteria) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    pub fn with_criteria(mut self, triples: Vec<CriteriaTriple>) -> Self {
        self.criteria = Some(triples);
        self
    }

    /// True if this request is a facet select.
    pub fn declares_criteria(&self) -> bool {
        self.criteria.is_some()
    }
}

/// Where a provider's projection lands in the virtual tree.
struct Placement {
    name: String,
    parent: Option<Arc<VirtualNodeIdentity>>,
    owning_name: Option<String>,
    ancestor: Option<Criteria>,
}

// ============================================================================
// Engine
// ============================================================================

pub struct ProjectionEngine {
    store: Arc<dyn CanonicalStore>,
    search: Arc<dyn FacetedQueryEngine>,
    strategies: StrategyTable,
    config: EngineConfig,
}

impl ProjectionEngine {
    pub fn new(store: Arc<dyn CanonicalStore>, search: Arc<dyn FacetedQueryEngine>) -> Self {
        Self::with_config(store, search, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn CanonicalStore>,
        search: Arc<dyn FacetedQueryEngine>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            search,
            strategies: StrategyTable::from(&config.strategies),
            config,
        }
    }

    /// Route an extra canonical type through `kind`.
    pub fn with_strategy(mut self, node_type: impl Into<String>, kind: ProjectorKind) -> Self {
        self.strategies.insert(node_type, kind);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategies(&self) -> &StrategyTable {
        &self.strategies
    }

    fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&*self.store, &self.config.sentinel_suffix)
    }

    fn guard(&self) -> RecursionGuard {
        RecursionGuard::new(self.config.max_depth)
    }

    // ------------------------------------------------------------------------
    // Mirror / facet select
    // ------------------------------------------------------------------------

    pub fn project_mirror(&self, request: &MirrorRequest, ctx: &ContextToken) -> Result<VirtualNode> {
        let target = match self.resolver().resolve(request.reference.as_deref(), ctx)? {
            Resolution::Target(node) => node,
            other => {
                let reason = other.empty_reason().unwrap_or(EmptyReason::NoTarget);
                return Ok(VirtualNode::unpopulated(request.name.as_str(), reason));
            }
        };

        if request.declares_criteria() && self.strategies.is_facet_select_like(&target) {
            tracing::warn!(
                name = %request.name,
                target = %target.id,
                target_type = %target.node_type,
                "facet select dereferences another facet select"
            );
            return Ok(VirtualNode::unpopulated(request.name.as_str(), EmptyReason::SelfReference));
        }

        if let Some(reason) = self.refuse(request.parent.as_deref(), &request.name, target.id) {
            return Ok(VirtualNode::unpopulated(request.name.as_str(), reason));
        }

        let triples = request.criteria.as_deref().unwrap_or_default();
        let criteria = compile(request.ancestor.as_ref(), triples);
        let identity = self.place(
            request.parent.as_ref(),
            request.owning_name.clone(),
            target.id,
            &request.name,
            criteria,
            ctx,
        );
        self.assemble(&target, identity, ctx)
    }

    // ------------------------------------------------------------------------
    // Faceted result sets
    // ------------------------------------------------------------------------

    pub fn project_result_set(
        &self,
        request: &ResultSetRequest,
        ctx: &ContextToken,
    ) -> Result<VirtualResultSet> {
        let name = request.node_name();
        for path in request.facet_paths() {
            if let Err(err) = validate_facet_path(path, &self.config) {
                tracing::error!(
                    query_name = %request.query_name,
                    facet = path,
                    error = %err,
                    "unresolvable facet path in result set"
                );
                return Ok(VirtualResultSet::unpopulated(name, EmptyReason::UnresolvedFacet));
            }
        }

        let target = match self.resolver().resolve(Some(request.docbase.as_str()), ctx)? {
            Resolution::Target(node) => node,
            other => {
                let reason = other.empty_reason().unwrap_or(EmptyReason::NoTarget);
                return Ok(VirtualResultSet::unpopulated(name, reason));
            }
        };
        if let Some(reason) = self.refuse(request.parent.as_deref(), name, target.id) {
            return Ok(VirtualResultSet::unpopulated(name, reason));
        }

        let identity = self.place(
            request.parent.as_ref(),
            None,
            target.id,
            name,
            request.ancestor.clone().unwrap_or_default(),
            ctx,
        );
        ResultSetProjector::new(&*self.store, &*self.search, &self.config).project(request, identity, ctx)
    }

    // ------------------------------------------------------------------------
    // Stored providers and lazy expansion
    // ------------------------------------------------------------------------

    /// Project a stored node as a root.
    ///
    /// Provider nodes (per the strategy table) are applied; any other node is
    /// mirrored as itself with empty criteria.
    pub fn project_node(&self, id: NodeId, ctx: &ContextToken) -> Result<VirtualNode> {
        let Some(node) = self.store.get_node(id, ctx)? else {
            return Ok(VirtualNode::unpopulated(id.to_string(), EmptyReason::NoTarget));
        };
        let name = self.entry_name(id, ctx)?;
        match self.strategies.kind_of(&node) {
            Some(kind) => self.provide(
                kind,
                &node,
                Placement {
                    name,
                    parent: None,
                    owning_name: None,
                    ancestor: None,
                },
                ctx,
            ),
            None => {
                let identity = Arc::new(VirtualNodeIdentity::root(
                    id,
                    ctx.clone(),
                    name,
                    Criteria::default(),
                ));
                self.assemble(&node, identity, ctx)
            }
        }
    }

    /// Populate a child identity produced by an earlier projection.
    ///
    /// A provider node is applied in place of the identity, inheriting its
    /// criteria, parent and name; the returned node then mirrors the
    /// provider's target. Any other node is mirrored under the identity
    /// itself.
    pub fn expand(&self, identity: &Arc<VirtualNodeIdentity>, ctx: &ContextToken) -> Result<VirtualNode> {
        let Some(node) = self.store.get_node(identity.canonical, ctx)? else {
            return Ok(VirtualNode::unpopulated(identity.name.as_str(), EmptyReason::NoTarget));
        };
        match self.strategies.kind_of(&node) {
            Some(kind) => self.provide(
                kind,
                &node,
                Placement {
                    name: identity.name.clone(),
                    parent: identity.parent.clone(),
                    owning_name: identity.owning_name.clone(),
                    ancestor: Some(identity.criteria()),
                },
                ctx,
            ),
            None => {
                let depth = identity.depth();
                if depth > self.config.max_depth {
                    tracing::warn!(identity = %identity, depth, "virtual chain too deep");
                    return Ok(VirtualNode::unpopulated(
                        identity.name.as_str(),
                        EmptyReason::RecursionLimit,
                    ));
                }
                self.assemble(&node, Arc::clone(identity), ctx)
            }
        }
    }

    fn provide(
        &self,
        kind: ProjectorKind,
        provider: &CanonicalNode,
        placement: Placement,
        ctx: &ContextToken,
    ) -> Result<VirtualNode> {
        tracing::debug!(provider = %provider.id, kind = kind.as_str(), name = %placement.name, "applying provider");
        match kind {
            ProjectorKind::PlainMirror | ProjectorKind::HandleAware => {
                let criteria = if kind.declares_criteria() {
                    match declared_triples(provider) {
                        Ok(triples) => Some(triples),
                        Err(err) => {
                            tracing::warn!(
                                provider = %provider.id,
                                name = %placement.name,
                                error = %err,
                                "malformed facet rules"
                            );
                            return Ok(VirtualNode::unpopulated(
                                placement.name,
                                EmptyReason::MalformedCriteria,
                            ));
                        }
                    }
                } else {
                    None
                };
                let request = MirrorRequest {
                    reference: provider.string_property(PROP_DOCBASE),
                    name: placement.name,
                    parent: placement.parent,
                    owning_name: placement.owning_name,
                    ancestor: placement.ancestor,
                    criteria,
                };
                self.project_mirror(&request, ctx)
            }
            ProjectorKind::ResultSet => {
                let mut request = match ResultSetRequest::from_provider(provider, &placement.name) {
                    Ok(request) => request,
                    Err(err) => {
                        tracing::warn!(
                            provider = %provider.id,
                            name = %placement.name,
                            error = %err,
                            "malformed facet search"
                        );
                        return Ok(VirtualNode::unpopulated(
                            placement.name,
                            EmptyReason::MalformedCriteria,
                        ));
                    }
                };
                request.parent = placement.parent;
                request.ancestor = placement.ancestor;
                Ok(self.project_result_set(&request, ctx)?.node)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn assemble(
        &self,
        node: &CanonicalNode,
        identity: Arc<VirtualNodeIdentity>,
        ctx: &ContextToken,
    ) -> Result<VirtualNode> {
        let criteria = identity.criteria();
        let children = ChildProjector::new(&*self.store, &self.config.kinds)
            .project(node, &criteria, &identity, ctx)?;
        Ok(MirrorAssembler::new(&self.config).assemble(node, identity, children))
    }

    fn place(
        &self,
        parent: Option<&Arc<VirtualNodeIdentity>>,
        owning_name: Option<String>,
        canonical: NodeId,
        name: &str,
        criteria: Criteria,
        ctx: &ContextToken,
    ) -> Arc<VirtualNodeIdentity> {
        Arc::new(match parent {
            Some(parent) => VirtualNodeIdentity::child(parent, owning_name, canonical, name, &criteria),
            None => VirtualNodeIdentity::root(canonical, ctx.clone(), name, criteria),
        })
    }

    /// Guard check for a dereference placed below `parent`.
    fn refuse(&self, parent: Option<&VirtualNodeIdentity>, name: &str, target: NodeId) -> Option<EmptyReason> {
        match self.guard().check(parent, target) {
            GuardVerdict::Allow => None,
            GuardVerdict::TooDeep { depth } => {
                tracing::warn!(name, %target, depth, "virtual chain too deep");
                Some(EmptyReason::RecursionLimit)
            }
            GuardVerdict::Cycle => {
                tracing::warn!(name, %target, "dereference cycles back to an ancestor");
                Some(EmptyReason::RecursionLimit)
            }
        }
    }

    /// Child entry name of `id` under its parent; the identifier otherwise.
    fn entry_name(&self, id: NodeId, ctx: &ContextToken) -> Result<String> {
        if let Some(parent) = self.store.get_parent(id, ctx)? {
            if let Some(name) = self.store.get_child_entry(parent, id, ctx)? {
                return Ok(name);
            }
        }
        Ok(id.to_string())
    }
}
