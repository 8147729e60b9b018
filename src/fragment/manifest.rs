//! Fragment manifest parsing and validation
//!
//! The manifest is produced by each fragment's own build and fetched from
//! `<remoteOrigin>/<entryManifestPath>`:
//!
//! ```json
//! {
//!   "name": "catalog",
//!   "framework": "react",
//!   "exposes": { "ProductCatalog": "./src/components/ProductCatalog" },
//!   "shared": [{ "key": "@fragment-host/shared", "version_range": "^1.0.0" }],
//!   "artifacts": [{ "path": "remoteEntry.js", "digest": "blake3:..." }]
//! }
//! ```

use std::collections::BTreeMap;

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::error::{self, LoadFailureKind, Result};
use crate::scope::parse_range;

/// A shared dependency the fragment expects to find in the scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRequirement {
    pub key: String,
    pub version_range: String,
}

/// A code artifact referenced by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Path relative to the fragment origin
    pub path: String,

    /// Optional `blake3:<hex>` digest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Parsed fragment manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentManifest {
    pub name: String,

    /// UI technology the fragment is built with; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    /// Exposed module name -> module path inside the fragment's build
    pub exposes: BTreeMap<String, String>,

    #[serde(default)]
    pub shared: Vec<SharedRequirement>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,
}

impl FragmentManifest {
    /// Parse manifest bytes fetched for fragment `expected_name`
    pub fn parse(expected_name: &str, bytes: &[u8]) -> Result<Self> {
        let manifest: FragmentManifest = serde_json::from_slice(bytes).map_err(|e| {
            error::fragment_load_failed(
                expected_name,
                LoadFailureKind::Parse,
                format!("invalid manifest: {e}"),
            )
        })?;
        manifest.validate(expected_name)?;
        Ok(manifest)
    }

    fn validate(&self, expected_name: &str) -> Result<()> {
        let fail = |message: String| {
            error::fragment_load_failed(expected_name, LoadFailureKind::Parse, message)
        };

        if self.name != expected_name {
            return Err(fail(format!(
                "manifest describes fragment '{}', expected '{expected_name}'",
                self.name
            )));
        }
        if self.exposes.is_empty() {
            return Err(fail("manifest exposes no modules".to_string()));
        }
        if let Some(artifact) = self.artifacts.iter().find(|a| a.path.trim().is_empty()) {
            return Err(fail(format!(
                "artifact with empty path (digest {:?})",
                artifact.digest
            )));
        }
        self.requirements()?;
        Ok(())
    }

    /// Shared requirements with parsed version ranges
    pub fn requirements(&self) -> Result<Vec<(String, VersionReq)>> {
        self.shared
            .iter()
            .map(|req| {
                parse_range(&req.version_range)
                    .map(|range| (req.key.clone(), range))
                    .map_err(|e| {
                        error::fragment_load_failed(
                            self.name.clone(),
                            LoadFailureKind::Parse,
                            format!("shared dependency '{}': {e}", req.key),
                        )
                    })
            })
            .collect()
    }

    pub fn exposed_modules(&self) -> impl Iterator<Item = &str> {
        self.exposes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;

    const CATALOG: &str = r#"{
        "name": "catalog",
        "framework": "react",
        "exposes": { "ProductCatalog": "./src/components/ProductCatalog" },
        "shared": [
            { "key": "react", "version_range": "^18.2.0" },
            { "key": "@fragment-host/shared", "version_range": "1.0.0" }
        ],
        "artifacts": [{ "path": "remoteEntry.js" }]
    }"#;

    fn parse_kind(name: &str, json: &str) -> Option<LoadFailureKind> {
        match FragmentManifest::parse(name, json.as_bytes()) {
            Err(HostError::FragmentLoadFailure { kind, .. }) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = FragmentManifest::parse("catalog", CATALOG.as_bytes()).unwrap();
        assert_eq!(manifest.framework.as_deref(), Some("react"));
        assert_eq!(
            manifest.exposed_modules().collect::<Vec<_>>(),
            vec!["ProductCatalog"]
        );
        let reqs = manifest.requirements().unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].0, "react");
    }

    #[test]
    fn test_minimal_manifest_defaults() {
        let json = r#"{"name": "cart", "exposes": {"ShoppingCart": "./cart"}}"#;
        let manifest = FragmentManifest::parse("cart", json.as_bytes()).unwrap();
        assert!(manifest.shared.is_empty());
        assert!(manifest.artifacts.is_empty());
        assert!(manifest.framework.is_none());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert_eq!(parse_kind("catalog", "{not json"), Some(LoadFailureKind::Parse));
    }

    #[test]
    fn test_rejects_name_mismatch() {
        assert_eq!(parse_kind("cart", CATALOG), Some(LoadFailureKind::Parse));
    }

    #[test]
    fn test_rejects_empty_exposes() {
        let json = r#"{"name": "cart", "exposes": {}}"#;
        assert_eq!(parse_kind("cart", json), Some(LoadFailureKind::Parse));
    }

    #[test]
    fn test_rejects_bad_version_range() {
        let json = r#"{
            "name": "cart",
            "exposes": {"ShoppingCart": "./cart"},
            "shared": [{"key": "react", "version_range": "eighteen"}]
        }"#;
        assert_eq!(parse_kind("cart", json), Some(LoadFailureKind::Parse));
    }
}
