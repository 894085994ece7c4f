use thiserror::Error;

use facetview_model::{QueryError, StoreError};

/// Hard failures of a projection.
///
/// Malformed input never ends up here: it yields an unpopulated node. Only
/// collaborator failures are propagated, unchanged.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
