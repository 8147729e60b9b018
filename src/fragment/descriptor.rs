//! Static description of where a fragment lives

use std::fmt;

use reqwest::Url;

use crate::error::{self, Result};

/// URL schemes a fragment origin may use
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Name and location of a remote fragment; immutable once registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDescriptor {
    pub name: String,
    pub remote_origin: Url,
    pub entry_manifest_path: String,
}

impl FragmentDescriptor {
    /// Validate and build a descriptor
    pub fn new(
        name: impl Into<String>,
        remote_origin: &str,
        entry_manifest_path: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let entry_manifest_path = entry_manifest_path.into();

        if name.trim().is_empty() {
            return Err(error::config_invalid("Fragment name cannot be empty"));
        }
        if entry_manifest_path.trim().is_empty() {
            return Err(error::config_invalid(format!(
                "Fragment '{name}' must specify an entry manifest path"
            )));
        }

        let remote_origin = Url::parse(remote_origin).map_err(|e| {
            error::config_invalid(format!(
                "Fragment '{name}' has an invalid remote origin '{remote_origin}': {e}"
            ))
        })?;
        if !SUPPORTED_SCHEMES.contains(&remote_origin.scheme()) {
            return Err(error::config_invalid(format!(
                "Fragment '{name}' uses unsupported scheme '{}'",
                remote_origin.scheme()
            )));
        }

        Ok(Self {
            name,
            remote_origin,
            entry_manifest_path,
        })
    }

    /// `<remoteOrigin>/<entryManifestPath>`
    pub fn manifest_url(&self) -> Result<Url> {
        self.resolve(&self.entry_manifest_path)
    }

    /// URL of an artifact path listed in the manifest
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let origin = self.remote_origin.as_str().trim_end_matches('/');
        let path = path.trim_start_matches("./").trim_start_matches('/');
        let joined = format!("{origin}/{path}");
        Url::parse(&joined).map_err(|e| {
            error::fragment_load_failed(
                self.name.clone(),
                error::LoadFailureKind::Parse,
                format!("invalid URL '{joined}': {e}"),
            )
        })
    }
}

impl fmt::Display for FragmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.remote_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;

    #[test]
    fn test_manifest_url_joins_origin_and_path() {
        let d = FragmentDescriptor::new("catalog", "http://localhost:3001", "remoteEntry.json")
            .unwrap();
        assert_eq!(
            d.manifest_url().unwrap().as_str(),
            "http://localhost:3001/remoteEntry.json"
        );
    }

    #[test]
    fn test_resolve_handles_slashes() {
        let d = FragmentDescriptor::new("cart", "https://cdn.example.com/cart/", "/m.json").unwrap();
        assert_eq!(
            d.manifest_url().unwrap().as_str(),
            "https://cdn.example.com/cart/m.json"
        );
        assert_eq!(
            d.resolve("./static/main.js").unwrap().as_str(),
            "https://cdn.example.com/cart/static/main.js"
        );
    }

    #[test]
    fn test_file_origin_is_supported() {
        let d = FragmentDescriptor::new("checkout", "file:///srv/fragments/checkout", "m.json")
            .unwrap();
        assert_eq!(
            d.manifest_url().unwrap().as_str(),
            "file:///srv/fragments/checkout/m.json"
        );
    }

    #[test]
    fn test_rejects_invalid_descriptors() {
        assert!(matches!(
            FragmentDescriptor::new("", "http://localhost", "m.json"),
            Err(HostError::ConfigInvalid { .. })
        ));
        assert!(matches!(
            FragmentDescriptor::new("x", "not a url", "m.json"),
            Err(HostError::ConfigInvalid { .. })
        ));
        assert!(matches!(
            FragmentDescriptor::new("x", "ftp://host", "m.json"),
            Err(HostError::ConfigInvalid { .. })
        ));
        assert!(matches!(
            FragmentDescriptor::new("x", "http://host", " "),
            Err(HostError::ConfigInvalid { .. })
        ));
    }
}
