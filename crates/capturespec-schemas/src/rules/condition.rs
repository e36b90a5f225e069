//! Predicates over sibling fields
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::constraint::values_equal;
use serde_json::{Map, Value};
use std::fmt;

/// A test against the resolved value of one driver field
///
/// Conditions are evaluated against the working instance, so a driver's
/// default is visible to its dependents.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Driver equals a literal
    Equals { field: String, value: Value },
    /// Driver is one of a set of literals
    OneOf { field: String, values: Vec<Value> },
    /// Driver has a value at all
    Present { field: String },
    /// Driver is a number strictly greater than `than`
    GreaterThan { field: String, than: f64 },
}

impl Condition {
    /// `field == value`
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// `field in values`
    pub fn one_of<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `field` is set
    pub fn present(field: &str) -> Self {
        Self::Present {
            field: field.to_string(),
        }
    }

    /// `field > than`
    pub fn greater_than(field: &str, than: f64) -> Self {
        Self::GreaterThan {
            field: field.to_string(),
            than,
        }
    }

    /// The driver field this condition reads
    pub fn driver(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::OneOf { field, .. }
            | Self::Present { field }
            | Self::GreaterThan { field, .. } => field,
        }
    }

    /// Evaluate against the resolved sibling values
    pub fn evaluate(&self, resolved: &Map<String, Value>) -> bool {
        let current = resolved.get(self.driver());
        match self {
            Self::Equals { value, .. } => current.is_some_and(|c| values_equal(c, value)),
            Self::OneOf { values, .. } => {
                current.is_some_and(|c| values.iter().any(|v| values_equal(c, v)))
            }
            Self::Present { .. } => current.is_some_and(|c| !c.is_null()),
            Self::GreaterThan { than, .. } => current
                .and_then(Value::as_f64)
                .is_some_and(|n| n > *than),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field} == {value}"),
            Self::OneOf { field, values } => {
                let list: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "{field} in [{}]", list.join(", "))
            }
            Self::Present { field } => write!(f, "{field} is present"),
            Self::GreaterThan { field, than } => write!(f, "{field} > {than}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_equals() {
        let c = Condition::equals("cache", true);
        assert!(c.evaluate(&resolved(json!({"cache": true}))));
        assert!(!c.evaluate(&resolved(json!({"cache": false}))));
        assert!(!c.evaluate(&resolved(json!({}))));
    }

    #[test]
    fn test_one_of() {
        let c = Condition::one_of("format", ["png", "jpg"]);
        assert!(c.evaluate(&resolved(json!({"format": "jpg"}))));
        assert!(!c.evaluate(&resolved(json!({"format": "pdf"}))));
    }

    #[test]
    fn test_present_ignores_null() {
        let c = Condition::present("selector");
        assert!(c.evaluate(&resolved(json!({"selector": "#main"}))));
        assert!(!c.evaluate(&resolved(json!({"selector": null}))));
        assert!(!c.evaluate(&resolved(json!({}))));
    }

    #[test]
    fn test_greater_than_is_strict() {
        let c = Condition::greater_than("timeout", 300.0);
        assert!(c.evaluate(&resolved(json!({"timeout": 301}))));
        assert!(!c.evaluate(&resolved(json!({"timeout": 300}))));
        assert!(!c.evaluate(&resolved(json!({"timeout": "400"}))));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let c = Condition::equals("n", 1);
        assert!(c.evaluate(&resolved(json!({"n": 1.0}))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Condition::greater_than("timeout", 300.0).to_string(), "timeout > 300");
        assert_eq!(
            Condition::one_of("format", ["png"]).to_string(),
            "format in [\"png\"]"
        );
    }
}
