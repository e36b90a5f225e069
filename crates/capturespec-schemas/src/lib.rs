//! Capturespec Schemas - conditional request validation
//!
//! This crate validates multi-field API requests whose fields depend on each
//! other: whether a field is allowed, its type, default and range can all
//! change with the resolved value of a sibling field. A request is checked
//! as a whole and every violation is reported, not just the first.
//!
//! ## Features
//!
//! - **Declarative rules**: kinds, transforms, bounds, enums, patterns and
//!   injected predicates such as the URI checker
//! - **Conditional fields**: `when X then A otherwise B` chains, forbidden
//!   branches with custom messages, defaults that read another field
//! - **Object constraints**: exclusive pairs and at-least-one groups
//! - **Layered composition**: base fields, variant extensions and transport
//!   auxiliaries, frozen into an immutable [`Schema`]
//! - **Catalog**: the screenshot, animation and bulk request variants
//! - **JSON Schema export**: draft 2020-12 documents for every schema
//!
//! ## Quick Start
//!
//! ```rust
//! use capturespec_schemas::{Catalog, ErrorKind, ValidateOptions};
//! use serde_json::json;
//!
//! let catalog = Catalog::shared().unwrap();
//! let schema = catalog.variant("take.get").unwrap();
//!
//! let validated = schema.validate(
//!     &json!({"url": "https://example.com", "cache_ttl": 20000}),
//!     &ValidateOptions::default(),
//! );
//! assert_eq!(validated.errors.len(), 1);
//! assert_eq!(validated.errors.violations[0].code, ErrorKind::UnexpectedField);
//! ```
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

pub mod catalog;
pub mod rules;
pub mod schema;
pub mod validation;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, CatalogError, Endpoint, Transport, VariantId};
pub use schema::{ObjectConstraint, Schema, SchemaBuilder, Validated};
pub use validation::{
    validate_batch, ErrorKind, SchemaError, SchemaResult, UriChecker, ValidateOptions,
    ValidationErrors, Violation,
};
