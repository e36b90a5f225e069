//! Validation primitives shared by every schema
//!
//! Errors, paths, the URI acceptability checker and the options that decide
//! whether a pass collects every violation or stops at the first one.
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod uri;

pub use base::ValidationContext;
pub use error::{ErrorKind, Rejection, SchemaError, SchemaResult, ValidationErrors, Violation};
pub use uri::UriChecker;

use crate::schema::{Schema, Validated};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for one validation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Collect every violation instead of stopping at the first
    pub aggregate_all_errors: bool,
    /// Maximum number of violations to collect (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            aggregate_all_errors: true,
            max_errors: 0,
        }
    }
}

impl ValidateOptions {
    /// Collect every violation
    pub fn aggregate() -> Self {
        Self::default()
    }

    /// Stop at the first violation
    pub fn fail_fast() -> Self {
        Self {
            aggregate_all_errors: false,
            max_errors: 0,
        }
    }

    /// Set maximum number of violations to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validate several requests against one schema
///
/// Every request is validated independently; with fail-fast options the
/// batch stops after the first rejected request.
///
/// ```rust
/// use capturespec_schemas::rules::{field, FieldRule};
/// use capturespec_schemas::validation::{validate_batch, ValidateOptions};
/// use capturespec_schemas::Schema;
/// use serde_json::json;
///
/// let schema = Schema::builder("demo")
///     .fields([field("url", FieldRule::string().required())])
///     .build()
///     .unwrap();
/// let results = validate_batch(&schema, &[json!({"url": "x"}), json!({})], &ValidateOptions::default());
/// assert!(results[0].is_valid());
/// assert!(!results[1].is_valid());
/// ```
pub fn validate_batch(schema: &Schema, requests: &[Value], options: &ValidateOptions) -> Vec<Validated> {
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        let validated = schema.validate(request, options);
        let rejected = !validated.is_valid();
        results.push(validated);
        if rejected && !options.aggregate_all_errors {
            break;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{field, FieldRule};
    use serde_json::json;

    #[test]
    fn test_options_defaults() {
        let options = ValidateOptions::default();
        assert!(options.aggregate_all_errors);
        assert_eq!(options.max_errors, 0);
        assert_eq!(ValidateOptions::aggregate(), options);
    }

    #[test]
    fn test_options_builders() {
        let options = ValidateOptions::fail_fast().with_max_errors(5);
        assert!(!options.aggregate_all_errors);
        assert_eq!(options.max_errors, 5);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: ValidateOptions = serde_json::from_value(json!({"max_errors": 3})).unwrap();
        assert!(options.aggregate_all_errors);
        assert_eq!(options.max_errors, 3);
    }

    #[test]
    fn test_batch_stops_on_fail_fast() {
        let schema = Schema::builder("demo")
            .fields([field("url", FieldRule::string().required())])
            .build()
            .unwrap();
        let requests = vec![json!({}), json!({"url": "x"}), json!({})];

        let all = validate_batch(&schema, &requests, &ValidateOptions::default());
        assert_eq!(all.len(), 3);
        assert!(all[1].is_valid());

        let first = validate_batch(&schema, &requests, &ValidateOptions::fail_fast());
        assert_eq!(first.len(), 1);
    }
}
