//! Catalog of capture request variants
//!
//! Each endpoint accepts one request shape per transport. The shapes are
//! layered: shared options, then endpoint options, then the credentials the
//! transport carries. `signature` is only accepted on GET, where requests
//! arrive as signed query strings.
//!
//! ```rust
//! use capturespec_schemas::catalog::{Catalog, VariantId};
//! use capturespec_schemas::ValidateOptions;
//! use serde_json::json;
//!
//! let catalog = Catalog::shared().unwrap();
//! let schema = catalog.get(VariantId::TAKE_POST).unwrap();
//! let validated = schema.validate(&json!({"url": "https://example.com"}), &ValidateOptions::default());
//! assert!(validated.is_valid());
//! assert_eq!(validated.value["format"], json!("jpg"));
//! ```
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

pub mod animate;
pub mod bulk;
pub mod common;
pub mod screenshot;

use crate::rules::{field, FieldDescriptor, FieldRule};
use crate::schema::{Schema, SchemaBuilder};
use crate::validation::{SchemaError, SchemaResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::debug;

/// API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Take,
    Animate,
    Bulk,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Take => "take",
            Self::Animate => "animate",
            Self::Bulk => "bulk",
        }
    }
}

/// How the request reaches the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Query string, optionally signed
    Get,
    /// JSON body
    Post,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }
}

/// Endpoint and transport pair naming one request shape, written `take.get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VariantId {
    pub endpoint: Endpoint,
    pub transport: Transport,
}

impl VariantId {
    pub const TAKE_GET: Self = Self::new(Endpoint::Take, Transport::Get);
    pub const TAKE_POST: Self = Self::new(Endpoint::Take, Transport::Post);
    pub const ANIMATE_GET: Self = Self::new(Endpoint::Animate, Transport::Get);
    pub const ANIMATE_POST: Self = Self::new(Endpoint::Animate, Transport::Post);
    pub const BULK_POST: Self = Self::new(Endpoint::Bulk, Transport::Post);

    /// Every variant the catalog serves, in listing order
    pub const ALL: [Self; 5] = [
        Self::TAKE_GET,
        Self::TAKE_POST,
        Self::ANIMATE_GET,
        Self::ANIMATE_POST,
        Self::BULK_POST,
    ];

    pub const fn new(endpoint: Endpoint, transport: Transport) -> Self {
        Self { endpoint, transport }
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.endpoint.as_str(), self.transport.as_str())
    }
}

impl FromStr for VariantId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.to_string() == wanted)
            .ok_or_else(|| CatalogError::UnknownVariant(s.to_string()))
    }
}

/// Catalog lookup failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("unknown variant '{0}', expected one of: take.get, take.post, animate.get, animate.post, bulk.post")]
    UnknownVariant(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Every request variant, built once
#[derive(Debug)]
pub struct Catalog {
    variants: Vec<(VariantId, Arc<Schema>)>,
}

static SHARED: OnceLock<Result<Catalog, SchemaError>> = OnceLock::new();

fn access_key() -> FieldDescriptor {
    field("access_key", FieldRule::string())
}

fn signature() -> FieldDescriptor {
    field("signature", FieldRule::string())
}

impl Catalog {
    /// Compose every variant
    pub fn build() -> SchemaResult<Self> {
        let common = common::common_fields()?;

        let take = Arc::new(
            Schema::builder("take.request")
                .fields(common.clone())
                .extend(screenshot::screenshot_fields())
                .exclusive("ip_country_code", "proxy")
                .at_least_one(["html", "url", "markdown"])
                .build()?,
        );
        let animate = Schema::builder("animate.request")
            .fields(common)
            .extend(animate::animate_fields())
            .exclusive("ip_country_code", "proxy")
            .at_least_one(["html", "url", "markdown"])
            .exclusive("scroll_stop_after_duration", "scroll_back_after_duration")
            .build()?;
        let bulk = Schema::builder("bulk.request")
            .fields(bulk::bulk_fields(Arc::clone(&take)))
            .build()?;

        let transported = |id: VariantId, base: &Schema| -> SchemaResult<(VariantId, Arc<Schema>)> {
            let mut builder = SchemaBuilder::from_schema(&id.to_string(), base).auxiliary([access_key()]);
            if id.transport == Transport::Get {
                builder = builder.auxiliary([signature()]);
            }
            Ok((id, Arc::new(builder.build()?)))
        };

        let variants = vec![
            transported(VariantId::TAKE_GET, take.as_ref())?,
            transported(VariantId::TAKE_POST, take.as_ref())?,
            transported(VariantId::ANIMATE_GET, &animate)?,
            transported(VariantId::ANIMATE_POST, &animate)?,
            transported(VariantId::BULK_POST, &bulk)?,
        ];
        debug!(variants = variants.len(), "catalog built");
        Ok(Self { variants })
    }

    /// Process-wide catalog, built on first use
    pub fn shared() -> Result<&'static Catalog, SchemaError> {
        SHARED.get_or_init(Self::build).as_ref().map_err(Clone::clone)
    }

    pub fn get(&self, id: VariantId) -> Option<&Arc<Schema>> {
        self.variants
            .iter()
            .find(|(variant, _)| *variant == id)
            .map(|(_, schema)| schema)
    }

    /// Look up a variant by its `endpoint.transport` name
    pub fn variant(&self, name: &str) -> Result<&Arc<Schema>, CatalogError> {
        let id: VariantId = name.parse()?;
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownVariant(name.to_string()))
    }

    /// Variants in listing order
    pub fn variants(&self) -> impl Iterator<Item = (VariantId, &Arc<Schema>)> + '_ {
        self.variants.iter().map(|(id, schema)| (*id, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_id_round_trip() {
        for id in VariantId::ALL {
            assert_eq!(id.to_string().parse::<VariantId>().unwrap(), id);
        }
        assert_eq!(" Take.GET ".parse::<VariantId>().unwrap(), VariantId::TAKE_GET);
    }

    #[test]
    fn test_unknown_variant() {
        assert_eq!(
            "bulk.get".parse::<VariantId>().unwrap_err(),
            CatalogError::UnknownVariant("bulk.get".into())
        );
        assert!(Catalog::shared().unwrap().variant("render.post").is_err());
    }

    #[test]
    fn test_catalog_builds_every_variant() {
        let catalog = Catalog::build().unwrap();
        let names: Vec<String> = catalog.variants().map(|(id, _)| id.to_string()).collect();
        assert_eq!(names, vec!["take.get", "take.post", "animate.get", "animate.post", "bulk.post"]);
        for (id, schema) in catalog.variants() {
            assert_eq!(schema.name(), id.to_string());
            assert!(schema.contains("access_key"));
            assert_eq!(schema.contains("signature"), id.transport == Transport::Get);
        }
    }

    #[test]
    fn test_shared_is_cached() {
        let a = Catalog::shared().unwrap();
        let b = Catalog::shared().unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
