//! FacetView projection engine
//!
//! Derives read-only virtual node trees from a canonical content store:
//!
//! - **mirrors** dereference a stored reference and copy the target
//! - **facet selects** do the same and filter, rank and single out the
//!   variants of every handle below the target
//! - **faceted result sets** run a facet/range query and mirror each hit
//!
//! The store and the query backend are reached through the
//! `CanonicalStore` / `FacetedQueryEngine` traits of `facetview-model`.
//!
//! ```ignore
//! let engine = ProjectionEngine::new(store, search);
//! let view = engine.project_mirror(
//!     &MirrorRequest::new(docbase, "news").with_criteria(vec![
//!         "content:lang=en:single".parse()?,
//!     ]),
//!     &ContextToken::new("request-1"),
//! )?;
//! for child in &view.children {
//!     let variant = engine.expand(child, &ctx)?;
//! }
//! ```

pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod guard;
pub mod mirror;
pub mod projector;
pub mod ranking;
pub mod resolver;
pub mod result_set;
pub mod strategy;

pub use config::{EngineConfig, NodeKinds};
pub use engine::{MirrorRequest, ProjectionEngine};
pub use error::ProjectionError;
pub use result_set::{FacetPathError, ResultSetRequest};
pub use strategy::{ProjectorKind, StrategyTable};
