//! FacetView data model
//!
//! Types shared by the canonical store, the faceted query engine and the
//! projection engine:
//!
//! - `ids`: canonical identifiers and opaque request context tokens
//! - `value`: typed (possibly multi-valued) property values
//! - `node`: canonical nodes as read from the store
//! - `facets`: persistent ordered facet maps (`ViewFilter`, `OrderPreference`)
//! - `criteria`: facet modes, criteria triples and compiled criteria
//! - `identity`: virtual node identities (the cache key of a projection)
//! - `virtual_node`: projected nodes and result sets
//! - `store` / `search`: the two external collaborator seams
//! - `names`: vocabulary constants

pub mod criteria;
pub mod error;
pub mod facets;
pub mod identity;
pub mod ids;
pub mod names;
pub mod node;
pub mod qname;
pub mod search;
pub mod store;
pub mod value;
pub mod virtual_node;

pub use criteria::{Criteria, CriteriaTriple, FacetMode};
pub use error::ModelError;
pub use facets::{FacetMap, OrderPreference, ViewFilter, ANY_VALUE};
pub use identity::VirtualNodeIdentity;
pub use ids::{ContextToken, NodeId};
pub use node::{CanonicalNode, ChildEntry};
pub use qname::{FacetPath, QualifiedName};
pub use search::{
    FacetConstraint, FacetedQueryEngine, HitsRequested, OrderBy, ParsedQuery, QueryError,
    RangeConstraint, SearchRequest, SearchResult,
};
pub use store::{CanonicalStore, StoreError};
pub use value::{PropertyValue, Value};
pub use virtual_node::{EmptyReason, Population, VirtualNode, VirtualResultSet};
