//! Product catalog data source
//!
//! The catalog is an external collaborator: an HTTP endpoint returning
//! product records. Only catalog-rendering fragments consume it.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::cart::{ItemDetails, Money, ProductId};
use crate::error::{HostError, Result};

/// Default public catalog used by the demo composition
pub const DEFAULT_CATALOG_ENDPOINT: &str =
    "https://api.escuelajs.co/api/v1/products?offset=0&limit=10";

/// A product record as served by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    pub fn new(id: u64, title: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    /// Cart view of the product; the first image becomes the image reference
    pub fn to_item_details(&self) -> ItemDetails {
        ItemDetails {
            id: ProductId(self.id),
            name: self.title.clone(),
            unit_price: Money::from_decimal(self.price),
            image_ref: self.images.first().cloned().unwrap_or_default(),
        }
    }
}

/// Source of product records
pub trait CatalogSource: Send + Sync {
    fn products(&self) -> BoxFuture<'_, Result<Vec<Product>>>;
}

/// Catalog served over HTTP
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCatalog {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self) -> Result<Vec<Product>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| catalog_error(&e))?;
        if !response.status().is_success() {
            return Err(HostError::CatalogFetchFailed {
                reason: format!("{} returned {}", self.endpoint, response.status()),
            });
        }
        response
            .json::<Vec<Product>>()
            .await
            .map_err(|e| catalog_error(&e))
    }
}

fn catalog_error(err: &reqwest::Error) -> HostError {
    HostError::CatalogFetchFailed {
        reason: err.to_string(),
    }
}

impl CatalogSource for HttpCatalog {
    fn products(&self) -> BoxFuture<'_, Result<Vec<Product>>> {
        Box::pin(self.fetch())
    }
}

/// Fixed product list, for offline compositions and tests
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The three sample products the catalog fragment ships with
    pub fn sample() -> Self {
        Self::new(vec![
            Product::new(1, "Product 1", 99.99).with_image("https://via.placeholder.com/200"),
            Product::new(2, "Product 2", 149.99).with_image("https://via.placeholder.com/200"),
            Product::new(3, "Product 3", 199.99).with_image("https://via.placeholder.com/200"),
        ])
    }
}

impl CatalogSource for StaticCatalog {
    fn products(&self) -> BoxFuture<'_, Result<Vec<Product>>> {
        let products = self.products.clone();
        Box::pin(async move { Ok(products) })
    }
}
