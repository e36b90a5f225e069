//! Shared utilities for command handlers

use crate::error::{Error, Result};
use capturespec_schemas::{Catalog, Schema};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Look up a variant in the shared catalog
pub fn load_variant(name: &str) -> Result<&'static Arc<Schema>> {
    let catalog = Catalog::shared()?;
    Ok(catalog.variant(name)?)
}

/// Read a request document as a JSON value
///
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "document read");

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| {
            tracing::debug!(error = %e, "YAML parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "YAML".to_string(),
            }
        })
    } else {
        serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(error = %e, "JSON parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON".to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("a.json");
        let yaml_path = dir.path().join("a.yml");
        fs::write(&json_path, r#"{"url": "https://example.com", "full_page": true}"#).unwrap();
        fs::write(&yaml_path, "url: https://example.com\nfull_page: true\n").unwrap();

        assert_eq!(read_document(&json_path).unwrap(), read_document(&yaml_path).unwrap());
    }

    #[test]
    fn test_missing_and_malformed_documents() {
        let dir = TempDir::new().unwrap();
        let missing = read_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, Error::FileNotFound { .. }));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{url: ").unwrap();
        let malformed = read_document(&path).unwrap_err();
        assert!(matches!(malformed, Error::InvalidFormat { ref expected, .. } if expected == "JSON"));
    }

    #[test]
    fn test_unknown_variant() {
        let err = load_variant("take.put").unwrap_err();
        assert!(err.should_show_help());
        assert!(load_variant(" Take.GET ").is_ok());
    }
}
