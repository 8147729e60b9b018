//! Common test utilities for fragment host integration tests

use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

/// A composition on disk: remotes served from `file://` origins and a
/// host configuration pointing at them
#[allow(dead_code)]
pub struct TestComposition {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to composition root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestComposition {
    /// Create a new test composition
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Composition with the catalog, cart and checkout remotes published
    pub fn standard() -> Self {
        let composition = Self::new();
        composition.publish_remote("catalog", &catalog_manifest());
        composition.publish_remote("cart", &cart_manifest());
        composition.publish_remote("checkout", &checkout_manifest());
        composition
    }

    /// Write a file in the composition
    pub fn write_file(&self, path: &str, content: impl AsRef<[u8]>) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Serve `manifest` as `remotes/<name>/fragment-manifest.json`
    pub fn publish_remote(&self, name: &str, manifest: &serde_json::Value) {
        self.write_file(
            &format!("remotes/{name}/fragment-manifest.json"),
            manifest.to_string(),
        );
    }

    /// Write `fragment-host.yaml` and return its path
    pub fn write_config(&self, yaml: &str) -> PathBuf {
        self.write_file("fragment-host.yaml", yaml);
        self.config_path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join("fragment-host.yaml")
    }

    pub fn root(&self) -> &Path {
        &self.path
    }
}

pub fn catalog_manifest() -> serde_json::Value {
    json!({
        "name": "catalog",
        "framework": "react",
        "exposes": { "ProductCatalog": "./src/components/ProductCatalog" },
        "shared": [{ "key": "@fragment-host/shared", "version_range": "^1.0.0" }]
    })
}

pub fn cart_manifest() -> serde_json::Value {
    json!({
        "name": "cart",
        "framework": "react",
        "exposes": { "ShoppingCart": "./src/components/ShoppingCart" },
        "shared": [{ "key": "@fragment-host/shared", "version_range": "1.0.0" }]
    })
}

pub fn checkout_manifest() -> serde_json::Value {
    json!({
        "name": "checkout",
        "framework": "vue",
        "exposes": { "Checkout": "./src/bootstrap" }
    })
}

/// Catalog fragment unreachable, cart available
#[allow(dead_code)]
pub const DEGRADED_CONFIG: &str = r#"
fragments:
  - name: catalog
    remote_origin: remotes/missing-catalog
  - name: cart
    remote_origin: remotes/cart
regions:
  - name: products
    fragment: catalog
    module: ProductCatalog
    fallback: Product catalog is unavailable
  - name: cart
    fragment: cart
    module: ShoppingCart
    fallback: Cart is unavailable
"#;

/// Every fragment available, with a fixed product list
#[allow(dead_code)]
pub const FULL_CONFIG: &str = r#"
fragments:
  - name: catalog
    remote_origin: remotes/catalog
  - name: cart
    remote_origin: remotes/cart
  - name: checkout
    remote_origin: remotes/checkout
regions:
  - name: products
    fragment: catalog
    module: ProductCatalog
  - name: cart
    fragment: cart
    module: ShoppingCart
  - name: checkout
    fragment: checkout
    module: Checkout
catalog:
  products:
    - { id: 1, title: Product 1, price: 99.99, images: [p1.png] }
    - { id: 2, title: Product 2, price: 149.99, images: [p2.png] }
"#;
