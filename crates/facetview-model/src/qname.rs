//! Qualified names and facet paths.
//!
//! A facet path is a `/`-separated list of qualified names
//! (`content:address/content:city`). Each component is `local` or
//! `prefix:local`; whether a prefix is *recognized* is a configuration
//! question answered by the caller.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub prefix: Option<String>,
    pub local: String,
}

fn valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '/' | ':' | '[' | ']' | '*' | '|' | '\''))
}

impl FromStr for QualifiedName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidQualifiedName(s.to_string());
        match s.split_once(':') {
            Some((prefix, local)) => {
                if !valid_part(prefix) || !valid_part(local) {
                    return Err(invalid());
                }
                Ok(Self {
                    prefix: Some(prefix.to_string()),
                    local: local.to_string(),
                })
            }
            None if valid_part(s) => Ok(Self {
                prefix: None,
                local: s.to_string(),
            }),
            None => Err(invalid()),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{p}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetPath(pub Vec<QualifiedName>);

impl FacetPath {
    pub fn components(&self) -> &[QualifiedName] {
        &self.0
    }

    /// Prefixes used anywhere in the path.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().filter_map(|q| q.prefix.as_deref())
    }
}

impl FromStr for FacetPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ModelError::InvalidQualifiedName(s.to_string()));
        }
        s.split('/')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(FacetPath)
    }
}

impl fmt::Display for FacetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_plain_names() {
        let q: QualifiedName = "content:color".parse().unwrap();
        assert_eq!(q.prefix.as_deref(), Some("content"));
        assert_eq!(q.local, "color");

        let plain: QualifiedName = "color".parse().unwrap();
        assert_eq!(plain.prefix, None);
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", ":color", "content:", "a:b:c", "has space", "x[1]"] {
            assert!(bad.parse::<QualifiedName>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn facet_path_splits_components() {
        let p: FacetPath = "content:address/content:city".parse().unwrap();
        assert_eq!(p.components().len(), 2);
        assert_eq!(p.prefixes().collect::<Vec<_>>(), vec!["content", "content"]);
        assert_eq!(p.to_string(), "content:address/content:city");
        assert!("a//b".parse::<FacetPath>().is_err());
    }
}
