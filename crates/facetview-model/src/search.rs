//! The faceted query engine seam.
//!
//! Only the contract the projection engine relies on is modelled here: a
//! parser turning `docbase#filter` strings into a query, and an executor
//! returning the total hit count plus a limited, ordered list of canonical
//! identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ModelError;
use crate::ids::{ContextToken, NodeId};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot parse query `{query}`: {message}")]
    Parse { query: String, message: String },

    #[error("search backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exact `facet = value` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetConstraint {
    pub facet: String,
    pub value: String,
}

impl FacetConstraint {
    pub fn new(facet: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            value: value.into(),
        }
    }
}

impl FromStr for FacetConstraint {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (facet, value) = s
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidConstraint(s.to_string()))?;
        if facet.trim().is_empty() {
            return Err(ModelError::InvalidConstraint(s.to_string()));
        }
        Ok(Self::new(facet.trim(), value))
    }
}

impl fmt::Display for FacetConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.facet, self.value)
    }
}

/// Inclusive range constraint; either bound may be open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeConstraint {
    pub facet: String,
    pub lower: Option<String>,
    pub upper: Option<String>,
}

impl RangeConstraint {
    pub fn new(facet: impl Into<String>, lower: Option<&str>, upper: Option<&str>) -> Self {
        Self {
            facet: facet.into(),
            lower: lower.map(str::to_string),
            upper: upper.map(str::to_string),
        }
    }
}

/// Parses `facet=lower..upper`; `facet=..upper` and `facet=lower..` leave a
/// bound open.
impl FromStr for RangeConstraint {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidRange(s.to_string());
        let (facet, range) = s.split_once('=').ok_or_else(invalid)?;
        let (lower, upper) = range.split_once("..").ok_or_else(invalid)?;
        if facet.trim().is_empty() {
            return Err(invalid());
        }
        let bound = |b: &str| {
            let b = b.trim();
            (!b.is_empty()).then(|| b.to_string())
        };
        Ok(Self {
            facet: facet.trim().to_string(),
            lower: bound(lower),
            upper: bound(upper),
        })
    }
}

impl fmt::Display for RangeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}..{}",
            self.facet,
            self.lower.as_deref().unwrap_or(""),
            self.upper.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub facet: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn ascending(facet: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            descending: false,
        }
    }

    pub fn descending(facet: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            descending: true,
        }
    }
}

/// `facet` sorts ascending, `-facet` descending.
impl FromStr for OrderBy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (facet, descending) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if facet.is_empty() {
            return Err(ModelError::InvalidQualifiedName(s.to_string()));
        }
        Ok(Self {
            facet: facet.to_string(),
            descending,
        })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.facet)
        } else {
            f.write_str(&self.facet)
        }
    }
}

/// Output of `FacetedQueryEngine::parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub raw: String,
    /// Scope reference as written in the query.
    pub docbase: String,
    /// Constraints carried by the inherited filter part.
    pub filter: Vec<FacetConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitsRequested {
    pub materialize: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub query_name: &'a str,
    pub query: &'a ParsedQuery,
    pub facets: &'a [FacetConstraint],
    pub ranges: &'a [RangeConstraint],
    pub external: Option<&'a ParsedQuery>,
    pub ordering: &'a [OrderBy],
    pub inherited_filter: Option<&'a str>,
    pub hits: HitsRequested,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Total number of matches, independent of limit/offset.
    pub length: u64,
    /// Materialized hits, already ordered and limited.
    pub hits: Vec<NodeId>,
}

impl SearchResult {
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hits.iter().copied()
    }
}

pub trait FacetedQueryEngine: Send + Sync {
    fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError>;

    fn execute(
        &self,
        request: &SearchRequest<'_>,
        ctx: &ContextToken,
    ) -> Result<SearchResult, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_with_open_bounds() {
        let r: RangeConstraint = "content:price=10..".parse().unwrap();
        assert_eq!(r.facet, "content:price");
        assert_eq!(r.lower.as_deref(), Some("10"));
        assert_eq!(r.upper, None);

        let r: RangeConstraint = "year=..2020".parse().unwrap();
        assert_eq!(r.lower, None);
        assert_eq!(r.upper.as_deref(), Some("2020"));

        assert!("year=2020".parse::<RangeConstraint>().is_err());
    }

    #[test]
    fn order_by_prefix_selects_direction() {
        let asc: OrderBy = "content:title".parse().unwrap();
        assert!(!asc.descending);
        let desc: OrderBy = "-content:date".parse().unwrap();
        assert!(desc.descending);
        assert_eq!(desc.facet, "content:date");
        assert_eq!(desc.to_string(), "-content:date");
    }
}
