//! Host configuration (`fragment-host.yaml`)
//!
//! Declares the fragments the host may load, the regions it renders, the
//! catalog endpoint and the notification timeout. Loaded once at start-up;
//! descriptors built from it are immutable for the process lifetime.

pub mod paths;

pub use paths::{CONFIG_ENV, LOCAL_CONFIG_FILE, resolve_config_path};

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    CatalogSource, DEFAULT_CATALOG_ENDPOINT, HttpCatalog, Product, StaticCatalog,
};
use crate::error::{self, Result};
use crate::fragment::FragmentDescriptor;
use crate::notification::DEFAULT_TIMEOUT;

/// Host configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub fragments: Vec<FragmentConfig>,

    #[serde(default)]
    pub regions: Vec<RegionConfig>,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Where one fragment is served from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentConfig {
    pub name: String,

    /// `http(s)://` or `file://` URL; a plain path is taken relative to the
    /// configuration file
    pub remote_origin: String,

    #[serde(default = "default_manifest_path")]
    pub entry_manifest_path: String,
}

/// A UI region bound to an exposed module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub fragment: String,
    pub module: String,

    /// Shown when the fragment cannot be loaded or mounted
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

/// Where the catalog fragment gets its products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_endpoint")]
    pub endpoint: String,

    /// Fixed product list used instead of the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_catalog_endpoint(),
            products: None,
        }
    }
}

impl CatalogConfig {
    pub fn source(&self) -> Arc<dyn CatalogSource> {
        match &self.products {
            Some(products) => Arc::new(StaticCatalog::new(products.clone())),
            None => Arc::new(HttpCatalog::new(&self.endpoint)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_manifest_path() -> String {
    "fragment-manifest.json".to_string()
}

fn default_fallback() -> String {
    "This section is unavailable".to_string()
}

fn default_catalog_endpoint() -> String {
    DEFAULT_CATALOG_ENDPOINT.to_string()
}

#[allow(clippy::cast_possible_truncation)]
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl HostConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Serialize configuration to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| error::config_invalid(e.to_string()))
    }

    /// Read, parse and validate a configuration file
    ///
    /// Plain-path origins are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(error::config_not_found(display));
        }
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| error::config_read_failed(&display, e.to_string()))?;
        let mut config: Self = serde_yaml::from_str(&yaml)
            .map_err(|e| error::config_parse_failed(&display, e.to_string()))?;

        let base = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
        for fragment in &mut config.fragments {
            fragment.remote_origin = absolutize_origin(&fragment.remote_origin, &base)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check names, origins and region bindings
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for fragment in &self.fragments {
            if !names.insert(fragment.name.as_str()) {
                return Err(error::config_invalid(format!(
                    "Fragment '{}' is declared more than once",
                    fragment.name
                )));
            }
            fragment.descriptor()?;
        }

        let mut regions = HashSet::new();
        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(error::config_invalid("Region name cannot be empty"));
            }
            if !regions.insert(region.name.as_str()) {
                return Err(error::config_invalid(format!(
                    "Region '{}' is declared more than once",
                    region.name
                )));
            }
            if !names.contains(region.fragment.as_str()) {
                return Err(error::config_invalid(format!(
                    "Region '{}' refers to unregistered fragment '{}'",
                    region.name, region.fragment
                )));
            }
            if region.module.trim().is_empty() {
                return Err(error::config_invalid(format!(
                    "Region '{}' must name an exposed module",
                    region.name
                )));
            }
        }
        Ok(())
    }

    /// Descriptors of every configured fragment
    pub fn descriptors(&self) -> Result<Vec<FragmentDescriptor>> {
        self.fragments.iter().map(FragmentConfig::descriptor).collect()
    }

    pub fn region(&self, name: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.name == name)
    }
}

impl FragmentConfig {
    pub fn descriptor(&self) -> Result<FragmentDescriptor> {
        FragmentDescriptor::new(&self.name, &self.remote_origin, &self.entry_manifest_path)
    }
}

/// Turn a plain path origin into a `file://` URL
fn absolutize_origin(origin: &str, base: &Path) -> Result<String> {
    if Url::parse(origin).is_ok() {
        return Ok(origin.to_string());
    }
    let path = base.join(origin);
    let path = path.canonicalize().unwrap_or(path);
    Url::from_directory_path(&path)
        .map(String::from)
        .map_err(|()| {
            error::config_invalid(format!(
                "Remote origin '{origin}' is neither a URL nor a usable path"
            ))
        })
}
