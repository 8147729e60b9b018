//! Fragments linked into this host
//!
//! Each remote fragment's exposed modules are implemented here and selected
//! by the manifest the fragment serves. `catalog` and `cart` are native and
//! reach the shared runtime through the scope; `checkout` is built on a
//! foreign UI framework and only talks to the bus and plain cart data.

pub mod cart;
pub mod catalog;
pub mod checkout;

use std::sync::Arc;

use crate::catalog::CatalogSource;
use crate::fragment::ModuleLinker;

pub use cart::ShoppingCart;
pub use catalog::{CatalogEntry, ProductCatalog};
pub use checkout::Checkout;

/// Range of the shared runtime the built-in fragments are written against
pub const RUNTIME_RANGE: &str = "^1.0.0";

/// Linker with every built-in fragment module
pub fn builtin_linker(catalog: Arc<dyn CatalogSource>) -> ModuleLinker {
    ModuleLinker::new()
        .link("catalog", "ProductCatalog", CatalogEntry::new(catalog))
        .link("cart", "ShoppingCart", cart::instantiate)
        .link("checkout", "Checkout", checkout::instantiate)
}
