use thiserror::Error;

/// Errors raised while parsing or validating model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid node identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("unknown facet mode `{0}`")]
    UnknownFacetMode(String),

    #[error("criteria arrays differ in length: {facets} facets, {values} values, {modes} modes")]
    MismatchedCriteria {
        facets: usize,
        values: usize,
        modes: usize,
    },

    #[error("invalid criteria triple `{0}` (expected `facet=value:mode`)")]
    InvalidTriple(String),

    #[error("invalid qualified name `{0}`")]
    InvalidQualifiedName(String),

    #[error("invalid range constraint `{0}` (expected `facet=lower..upper`)")]
    InvalidRange(String),

    #[error("invalid facet constraint `{0}` (expected `facet=value`)")]
    InvalidConstraint(String),
}
