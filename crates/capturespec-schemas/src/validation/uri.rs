//! URI acceptability checker for URL-like request fields
//!
//! The checker is field-agnostic: the label only shapes the messages. It runs
//! its steps in order and stops at the first failure:
//!
//! 1. empty or absent values are rejected (`MissingValue`)
//! 2. surrounding whitespace is rejected (`MalformedInput`)
//! 3. the value must parse as an absolute URI (`InvalidUri`)
//! 4. the scheme must be in the accepted set (`DisallowedScheme`)
//! 5. the part after `scheme://` must not start with another `http://` or
//!    `https://` (`NestedSchemeRejected`)
//!
//! Accepted values are returned byte-for-byte unchanged.
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::Predicate;
use crate::validation::error::{ErrorKind, Rejection};
use serde_json::Value;
use url::Url;

const NESTED_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Checks that a string is an acceptable absolute URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriChecker {
    /// Accepted schemes, lowercase. `None` accepts any scheme.
    schemes: Option<Vec<String>>,
}

impl Default for UriChecker {
    fn default() -> Self {
        Self::web()
    }
}

impl UriChecker {
    /// Accept `http` and `https`
    pub fn web() -> Self {
        Self::with_schemes(&["http", "https"])
    }

    /// Accept only the given schemes
    pub fn with_schemes(schemes: &[&str]) -> Self {
        Self {
            schemes: Some(schemes.iter().map(|s| s.to_ascii_lowercase()).collect()),
        }
    }

    /// Accept any absolute URI
    pub fn absolute() -> Self {
        Self { schemes: None }
    }

    /// Schemes this checker accepts, if restricted
    pub fn schemes(&self) -> Option<&[String]> {
        self.schemes.as_deref()
    }

    /// Run the checks against a possibly absent value
    pub fn check_str<'a>(&self, label: &str, value: Option<&'a str>) -> Result<&'a str, Rejection> {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                return Err(Rejection::new(
                    ErrorKind::MissingValue,
                    format!("\"{label}\" must be specified"),
                ))
            }
        };

        if value.trim() != value {
            return Err(Rejection::new(
                ErrorKind::MalformedInput,
                format!("\"{label}\" must be specified without leading and trailing white spaces"),
            ));
        }

        let parsed = Url::parse(value).map_err(|_| {
            Rejection::new(ErrorKind::InvalidUri, format!("\"{label}\" must be a valid URI"))
        })?;
        let scheme = parsed.scheme();

        if let Some(allowed) = &self.schemes {
            if !allowed.iter().any(|s| s == scheme) {
                return Err(Rejection::new(
                    ErrorKind::DisallowedScheme,
                    format!(
                        "\"{label}\" must be a valid URI with a scheme matching the {} pattern",
                        allowed.join("|")
                    ),
                ));
            }
        }

        // scheme is ASCII and matches the input prefix case-insensitively
        let rest = value.get(scheme.len() + 1..).unwrap_or("");
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        if NESTED_PREFIXES.iter().any(|p| starts_with_ignore_case(rest, p)) {
            return Err(Rejection::new(
                ErrorKind::NestedSchemeRejected,
                format!("\"{label}\" must be a valid URI with a single scheme, found a nested one"),
            ));
        }

        Ok(value)
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

impl Predicate for UriChecker {
    fn name(&self) -> &str {
        "uri"
    }

    fn check(&self, label: &str, value: &Value) -> Result<Value, Rejection> {
        match value {
            Value::String(s) => self.check_str(label, Some(s)).map(|_| value.clone()),
            Value::Null => self.check_str(label, None).map(|_| Value::Null),
            _ => Err(Rejection::new(
                ErrorKind::TypeMismatch,
                format!("\"{label}\" must be a string"),
            )),
        }
    }

    fn json_schema_format(&self) -> Option<&str> {
        Some("uri")
    }
}
