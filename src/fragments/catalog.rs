//! Product list with add-to-cart buttons
//!
//! Products are fetched after mount; the container shows a loading line
//! until they arrive. Selecting a product publishes an `add-to-cart`
//! request rather than touching the cart directly.

use std::sync::Arc;

use tracing::warn;

use super::RUNTIME_RANGE;
use crate::bus::{EventBus, topics};
use crate::cart::Money;
use crate::catalog::{CatalogSource, Product};
use crate::context::{HostContext, SHARED_RUNTIME_KEY, SharedRuntime};
use crate::error::Result;
use crate::fragment::FragmentEntry;
use crate::mount::{Container, Mountable, Node};
use crate::scope::SharedProvision;

/// Linked entry of `catalog/ProductCatalog`
pub struct CatalogEntry {
    source: Arc<dyn CatalogSource>,
}

impl CatalogEntry {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }
}

impl FragmentEntry for CatalogEntry {
    fn instantiate(&self, ctx: &HostContext) -> Result<Box<dyn Mountable>> {
        let runtime = ctx.require_runtime(RUNTIME_RANGE)?;
        Ok(Box::new(ProductCatalog {
            source: Arc::clone(&self.source),
            bus: runtime.bus.clone(),
        }))
    }

    // The catalog build bundles the shared runtime too.
    fn provision(&self, key: &str) -> Option<SharedProvision> {
        (key == SHARED_RUNTIME_KEY).then(SharedRuntime::provision)
    }
}

pub struct ProductCatalog {
    source: Arc<dyn CatalogSource>,
    bus: EventBus,
}

impl Mountable for ProductCatalog {
    fn mount(&self, container: &Container) -> Result<()> {
        container.replace(vec![Node::text("status", "Loading products...")]);
        let generation = container.generation();

        let target = container.clone();
        let source = Arc::clone(&self.source);
        let bus = self.bus.clone();
        container.spawn_startup(async move {
            let nodes = match source.products().await {
                Ok(products) => render(&products, &bus),
                Err(e) => {
                    warn!(error = %e, "catalog fetch failed");
                    vec![Node::text("status", format!("Error: {e}"))]
                }
            };
            target.replace_if(generation, nodes);
        })
    }
}

fn render(products: &[Product], bus: &EventBus) -> Vec<Node> {
    let mut nodes = vec![Node::text("title", "Products")];
    if products.is_empty() {
        nodes.push(Node::text("status", "No products available"));
    }
    for product in products {
        nodes.push(Node::text(
            format!("product-{}", product.id),
            format!(
                "{} - {}",
                product.title,
                Money::from_decimal(product.price)
            ),
        ));

        let bus = bus.clone();
        let request = product.clone();
        nodes.push(Node::button(
            format!("add-{}", product.id),
            "Add to cart",
            move || {
                if let Err(e) = bus.publish_typed(topics::ADD_TO_CART, &request) {
                    warn!(product = request.id, error = %e, "add-to-cart request dropped");
                }
            },
        ));
    }
    nodes
}
