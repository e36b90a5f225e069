//! Composed schemas and the per-request validation entry point
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod export;
mod resolver;

pub use builder::SchemaBuilder;

use crate::rules::FieldDescriptor;
use crate::validation::base::ValidationContext;
use crate::validation::error::{ErrorKind, ValidationErrors, Violation};
use crate::validation::ValidateOptions;
use resolver::RequestInstance;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::trace;

/// Cross-field invariant checked against raw key presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectConstraint {
    /// At most one of the two may be supplied
    ExclusivePair(String, String),
    /// At least one of the group must be supplied
    AtLeastOneOf(Vec<String>),
}

impl ObjectConstraint {
    /// Fields this constraint names
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::ExclusivePair(a, b) => vec![a.as_str(), b.as_str()],
            Self::AtLeastOneOf(group) => group.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn check(&self, raw: &Map<String, Value>, ctx: &ValidationContext) -> Option<Violation> {
        match self {
            Self::ExclusivePair(a, b) if raw.contains_key(a) && raw.contains_key(b) => {
                Some(ctx.violation_of(
                    ErrorKind::MutualExclusionViolation,
                    format!(
                        "\"{}\" contains a conflict between optional exclusive peers [{a}, {b}]",
                        ctx.label()
                    ),
                ))
            }
            Self::AtLeastOneOf(group) if !group.iter().any(|f| raw.contains_key(f)) => {
                Some(ctx.violation_of(
                    ErrorKind::MissingRequiredGroup,
                    format!(
                        "\"{}\" must contain at least one of [{}]",
                        ctx.label(),
                        group.join(", ")
                    ),
                ))
            }
            _ => None,
        }
    }
}

/// Result of one validation call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validated {
    /// Accepted fields plus every resolved default
    pub value: Map<String, Value>,
    /// Violations in discovery order
    pub errors: ValidationErrors,
}

impl Validated {
    pub(crate) fn rejected(violation: Violation) -> Self {
        Self {
            value: Map::new(),
            errors: violation.into(),
        }
    }

    /// Whether no violation was found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The normalized object, or the violations
    pub fn into_result(self) -> Result<Map<String, Value>, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(self.value)
        } else {
            Err(self.errors)
        }
    }
}

/// An immutable, fully composed request shape
///
/// Built once by [`SchemaBuilder`] and shared read-only; validation never
/// mutates it.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
    constraints: Vec<ObjectConstraint>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptors in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn constraints(&self) -> &[ObjectConstraint] {
        &self.constraints
    }

    /// Field names in the order the resolver visits them
    pub fn resolution_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.fields[i].name()).collect()
    }

    /// Validate a raw request
    pub fn validate(&self, input: &Value, options: &ValidateOptions) -> Validated {
        let ctx = ValidationContext::new(*options);
        self.summarize(self.validate_in(input, &ctx))
    }

    /// Validate a raw request that is already a JSON object
    pub fn validate_map(&self, input: &Map<String, Value>, options: &ValidateOptions) -> Validated {
        let ctx = ValidationContext::new(*options);
        let mut instance = RequestInstance::new(self, input);
        instance.run(&ctx);
        self.summarize(instance.finish(&ctx))
    }

    fn summarize(&self, validated: Validated) -> Validated {
        trace!(
            schema = %self.name,
            violations = validated.errors.len(),
            "request validated"
        );
        validated
    }

    pub(crate) fn validate_in(&self, input: &Value, ctx: &ValidationContext) -> Validated {
        let Some(raw) = input.as_object() else {
            return Validated::rejected(ctx.violation_of(
                ErrorKind::TypeMismatch,
                format!("\"{}\" must be of type object", ctx.label()),
            ));
        };
        let mut instance = RequestInstance::new(self, raw);
        instance.run(ctx);
        instance.finish(ctx)
    }

    pub(crate) fn from_parts(
        name: String,
        fields: Vec<FieldDescriptor>,
        index: HashMap<String, usize>,
        order: Vec<usize>,
        constraints: Vec<ObjectConstraint>,
    ) -> Self {
        Self {
            name,
            fields,
            index,
            order,
            constraints,
        }
    }

    pub(crate) fn descriptor_at(&self, i: usize) -> &FieldDescriptor {
        &self.fields[i]
    }

    pub(crate) fn order_indices(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{field, forbidden_with, when, Condition, FieldRule};
    use serde_json::json;

    fn cache_schema() -> Schema {
        Schema::builder("cache")
            .fields([
                field(
                    "cache_ttl",
                    when(
                        Condition::equals("cache", true),
                        FieldRule::integer().range(14400, 2592000).default(14400),
                        forbidden_with("The `cache_ttl` option cannot be used when the `cache` option is false or not set."),
                    ),
                ),
                field("cache", FieldRule::boolean().default(false)),
                field("url", FieldRule::string()),
                field("html", FieldRule::string()),
            ])
            .at_least_one(["url", "html"])
            .exclusive("url", "html")
            .build()
            .unwrap()
    }

    #[test]
    fn test_driver_resolves_before_dependent() {
        let schema = cache_schema();
        assert_eq!(schema.resolution_order(), vec!["cache", "cache_ttl", "url", "html"]);
    }

    #[test]
    fn test_defaults_follow_driver_value() {
        let schema = cache_schema();
        let validated = schema.validate(&json!({"url": "x", "cache": "true"}), &ValidateOptions::default());
        assert!(validated.is_valid(), "{:?}", validated.errors);
        assert_eq!(validated.value["cache"], json!(true));
        assert_eq!(validated.value["cache_ttl"], json!(14400));

        let validated = schema.validate(&json!({"url": "x"}), &ValidateOptions::default());
        assert!(!validated.value.contains_key("cache_ttl"));
    }

    #[test]
    fn test_forbidden_uses_custom_message() {
        let schema = cache_schema();
        let validated = schema.validate(&json!({"url": "x", "cache_ttl": 20000}), &ValidateOptions::default());
        assert_eq!(validated.errors.len(), 1);
        let v = &validated.errors.violations[0];
        assert_eq!(v.code, ErrorKind::UnexpectedField);
        assert_eq!(v.path, "$.cache_ttl");
        assert!(v.message.starts_with("The `cache_ttl` option cannot be used"));
    }

    #[test]
    fn test_object_constraints_and_unknown_keys() {
        let schema = cache_schema();
        let validated = schema.validate(&json!({"url": "x", "html": "y", "extra": 1}), &ValidateOptions::default());
        let codes: Vec<_> = validated.errors.iter().map(|v| v.code).collect();
        assert_eq!(codes, vec![ErrorKind::UnexpectedField, ErrorKind::MutualExclusionViolation]);
        assert_eq!(validated.errors.violations[0].path, "$.extra");
        assert!(!validated.value.contains_key("extra"));

        let validated = schema.validate(&json!({}), &ValidateOptions::default());
        assert_eq!(validated.errors.count_of(ErrorKind::MissingRequiredGroup), 1);
        assert_eq!(
            validated.errors.violations[0].message,
            "\"value\" must contain at least one of [url, html]"
        );
    }

    #[test]
    fn test_non_object_input() {
        let schema = cache_schema();
        let validated = schema.validate(&json!([1, 2]), &ValidateOptions::default());
        assert_eq!(validated.errors.violations[0].code, ErrorKind::TypeMismatch);
        assert_eq!(validated.errors.violations[0].path, "$");
    }

    #[test]
    fn test_fail_fast_stops_after_first() {
        let schema = cache_schema();
        let input = json!({"cache": 5, "url": 1, "html": 2, "extra": true});
        let all = schema.validate(&input, &ValidateOptions::default());
        assert!(all.errors.len() >= 4);
        let first = schema.validate(&input, &ValidateOptions::fail_fast());
        assert_eq!(first.errors.len(), 1);
        let capped = schema.validate(&input, &ValidateOptions::default().with_max_errors(2));
        assert_eq!(capped.errors.len(), 2);
    }

    #[test]
    fn test_validate_map_matches_validate() {
        let schema = cache_schema();
        for input in [json!({"html": "<p>hi</p>"}), json!({"html": "<p>hi</p>", "colour": 1})] {
            let a = schema.validate(&input, &ValidateOptions::fail_fast());
            let b = schema.validate_map(input.as_object().unwrap(), &ValidateOptions::fail_fast());
            assert_eq!(a, b);
        }
    }
}
