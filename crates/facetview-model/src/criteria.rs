//! Facet modes, criteria triples and compiled criteria.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::facets::{OrderPreference, ViewFilter};

/// How a declared facet rule affects the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacetMode {
    /// Insert into the view filter.
    Stick,
    /// Same as `Stick`.
    Select,
    /// Insert into the view filter and switch to a singled view.
    Single,
    /// Insert into the order preference.
    Prefer,
    /// Insert into the order preference and switch to a singled view.
    PreferSingle,
    /// Remove the facet from the view filter.
    Clear,
}

impl FacetMode {
    pub const ALL: [FacetMode; 6] = [
        FacetMode::Stick,
        FacetMode::Select,
        FacetMode::Single,
        FacetMode::Prefer,
        FacetMode::PreferSingle,
        FacetMode::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacetMode::Stick => "stick",
            FacetMode::Select => "select",
            FacetMode::Single => "single",
            FacetMode::Prefer => "prefer",
            FacetMode::PreferSingle => "prefer-single",
            FacetMode::Clear => "clear",
        }
    }
}

impl fmt::Display for FacetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim().to_ascii_lowercase();
        FacetMode::ALL
            .into_iter()
            .find(|m| m.as_str() == mode)
            .ok_or_else(|| ModelError::UnknownFacetMode(s.to_string()))
    }
}

/// One declared rule: `(facet, value, mode)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriteriaTriple {
    pub facet: String,
    pub value: String,
    pub mode: FacetMode,
}

impl CriteriaTriple {
    pub fn new(facet: impl Into<String>, value: impl Into<String>, mode: FacetMode) -> Self {
        Self {
            facet: facet.into(),
            value: value.into(),
            mode,
        }
    }

    /// Build triples from the three parallel arrays stored on a facet-select node.
    pub fn zip<F, V, M>(facets: &[F], values: &[V], modes: &[M]) -> Result<Vec<Self>, ModelError>
    where
        F: AsRef<str>,
        V: AsRef<str>,
        M: AsRef<str>,
    {
        if facets.len() != values.len() || facets.len() != modes.len() {
            return Err(ModelError::MismatchedCriteria {
                facets: facets.len(),
                values: values.len(),
                modes: modes.len(),
            });
        }
        facets
            .iter()
            .zip(values)
            .zip(modes)
            .map(|((f, v), m)| Ok(Self::new(f.as_ref(), v.as_ref(), m.as_ref().parse()?)))
            .collect()
    }
}

impl fmt::Display for CriteriaTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:{}", self.facet, self.value, self.mode)
    }
}

/// Parses `facet=value:mode`. Facets may carry a namespace prefix
/// (`content:color=red:stick`), so the mode is taken after the last `:`.
impl FromStr for CriteriaTriple {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, mode) = s
            .rsplit_once(':')
            .ok_or_else(|| ModelError::InvalidTriple(s.to_string()))?;
        let (facet, value) = rest
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidTriple(s.to_string()))?;
        if facet.trim().is_empty() {
            return Err(ModelError::InvalidTriple(s.to_string()));
        }
        Ok(Self::new(facet.trim(), value, mode.parse()?))
    }
}

/// Compiled view state: what a virtual identity carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Criteria {
    pub view: ViewFilter,
    pub order: Option<OrderPreference>,
    pub singled: bool,
}

impl Criteria {
    pub fn new(view: ViewFilter, order: Option<OrderPreference>, singled: bool) -> Self {
        Self {
            view,
            order,
            singled,
        }
    }

    /// Order preference, treating an empty map as absent.
    pub fn ranking(&self) -> Option<&OrderPreference> {
        self.order.as_ref().filter(|o| !o.is_empty())
    }
}
