//! Violation and schema-construction error types
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed taxonomy of per-request rule failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required value is absent or empty
    MissingValue,
    /// The value has the right type but an unacceptable shape
    MalformedInput,
    /// The value does not parse as an absolute URI
    InvalidUri,
    /// The URI scheme is not in the accepted set
    DisallowedScheme,
    /// The URI embeds a second `http://` or `https://` scheme
    NestedSchemeRejected,
    /// A number, string length or array size is outside its bounds
    OutOfRange,
    /// The value is not one of the enumerated values
    NotAMember,
    /// The key is not declared, or its condition forbids it
    UnexpectedField,
    /// Both members of an exclusive pair were supplied
    MutualExclusionViolation,
    /// None of a required group of fields was supplied
    MissingRequiredGroup,
    /// The value has the wrong JSON type
    TypeMismatch,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingValue => "missing_value",
            Self::MalformedInput => "malformed_input",
            Self::InvalidUri => "invalid_uri",
            Self::DisallowedScheme => "disallowed_scheme",
            Self::NestedSchemeRejected => "nested_scheme_rejected",
            Self::OutOfRange => "out_of_range",
            Self::NotAMember => "not_a_member",
            Self::UnexpectedField => "unexpected_field",
            Self::MutualExclusionViolation => "mutual_exclusion_violation",
            Self::MissingRequiredGroup => "missing_required_group",
            Self::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single rule failure with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending value, e.g. `$.requests[2].url`
    pub path: String,
    /// Human-readable message
    pub message: String,
    /// Failure kind
    pub code: ErrorKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

impl Violation {
    /// Create a new violation
    pub fn new<P, M>(path: P, message: M, code: ErrorKind) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

/// A failure produced by a primitive check before it is placed at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Failure kind
    pub code: ErrorKind,
    /// Message, already carrying the field label
    pub message: String,
}

impl Rejection {
    /// Create a new rejection
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Ordered collection of violations from one validation call
///
/// Duplicates for the same path are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Violations in the order they were found
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s) occurred:", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append every violation of another collection
    pub fn extend(&mut self, other: ValidationErrors) {
        self.violations.extend(other.violations);
    }

    /// Check if there are any violations
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Iterate over the violations
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Violations whose path equals `path`
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.path == path)
    }

    /// Number of violations of a given kind
    pub fn count_of(&self, code: ErrorKind) -> usize {
        self.violations.iter().filter(|v| v.code == code).count()
    }

    /// Ok if empty, Err otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Violation> for ValidationErrors {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl From<Vec<Violation>> for ValidationErrors {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Schema construction failure
///
/// These are raised while a schema is built and abort startup; they are never
/// reported for an individual request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two descriptors in the same layer share a name
    #[error("schema '{schema}': field '{field}' is declared more than once")]
    DuplicateField { schema: String, field: String },

    /// A condition, default reference or object constraint names an undeclared field
    #[error("schema '{schema}': '{referrer}' references unknown field '{field}'")]
    UnknownField {
        schema: String,
        referrer: String,
        field: String,
    },

    /// Conditions and default references form a cycle
    #[error("schema '{schema}': dependency cycle through [{}]", .fields.join(", "))]
    DependencyCycle { schema: String, fields: Vec<String> },

    /// A pattern constraint does not compile
    #[error("pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let v = Violation::new("$.url", "\"url\" must be a valid URI", ErrorKind::InvalidUri);
        assert_eq!(v.to_string(), "[invalid_uri] $.url: \"url\" must be a valid URI");
    }

    #[test]
    fn test_errors_keep_duplicates_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add(Violation::new("$.a", "first", ErrorKind::OutOfRange));
        errors.add(Violation::new("$.a", "second", ErrorKind::OutOfRange));
        assert_eq!(errors.len(), 2);
        let messages: Vec<_> = errors.at("$.a").map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NestedSchemeRejected).unwrap();
        assert_eq!(json, "\"nested_scheme_rejected\"");
    }

    #[test]
    fn test_cycle_message_lists_fields() {
        let err = SchemaError::DependencyCycle {
            schema: "demo".into(),
            fields: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "schema 'demo': dependency cycle through [a, b]");
    }
}
