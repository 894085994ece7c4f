//! Typed property values.
//!
//! Facet matching never looks at the value type: it compares the canonical
//! textual form (`Value::as_text`), so `Long(3)` matches a required `"3"`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::ids::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Reference(NodeId),
}

impl Value {
    /// Canonical textual form used for facet comparisons.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Long(v) => Cow::Owned(v.to_string()),
            Value::Double(v) => Cow::Owned(v.to_string()),
            Value::Boolean(v) => Cow::Borrowed(if *v { "true" } else { "false" }),
            Value::Reference(id) => Cow::Owned(id.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Reference(id)
    }
}

/// A property holds either one value or an ordered list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(Value),
    Multi(Vec<Value>),
}

impl PropertyValue {
    pub fn single(value: impl Into<Value>) -> Self {
        PropertyValue::Single(value.into())
    }

    pub fn multi<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        PropertyValue::Multi(values.into_iter().map(Into::into).collect())
    }

    pub fn values(&self) -> &[Value] {
        match self {
            PropertyValue::Single(v) => std::slice::from_ref(v),
            PropertyValue::Multi(vs) => vs,
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, PropertyValue::Multi(_))
    }

    pub fn first(&self) -> Option<&Value> {
        self.values().first()
    }

    /// True if any of the values has the given textual form.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.values().iter().any(|v| v.as_text() == needle)
    }

    pub fn texts(&self) -> Vec<String> {
        self.values().iter().map(|v| v.as_text().into_owned()).collect()
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        PropertyValue::Single(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_value_contains_text() {
        let p = PropertyValue::multi(["red", "blue"]);
        assert!(p.contains_text("blue"));
        assert!(!p.contains_text("green"));
        assert!(p.is_multiple());
    }

    #[test]
    fn numeric_values_compare_textually() {
        let p = PropertyValue::single(3i64);
        assert!(p.contains_text("3"));
        assert_eq!(p.first().and_then(Value::as_long), Some(3));
    }

    #[test]
    fn json_shape_is_compact() {
        let p = PropertyValue::multi(["a", "b"]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"[{"string":"a"},{"string":"b"}]"#);
        let back: PropertyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
