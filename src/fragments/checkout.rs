//! Checkout built on a foreign UI framework
//!
//! Mounted through the imperative adapter only. It never holds the cart
//! store: it reads an order summary as plain data, re-renders on
//! `cart-changed` and `item-added`, and announces `checkout-completed` when
//! the order is placed. The order is taken from the summary at click time.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::bus::{EventBus, topics};
use crate::cart::{CartSnapshot, Money};
use crate::context::HostContext;
use crate::error::Result;
use crate::mount::{Container, Mountable, Node};

/// UI technology the checkout fragment is built with
pub const FRAMEWORK: &str = "vue";

type Summary = Arc<dyn Fn() -> CartSnapshot + Send + Sync>;

/// Payload of `checkout-completed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPlaced {
    pub total_items: u64,
    pub total_price: Money,
}

/// Linked entry of `checkout/Checkout`
pub fn instantiate(ctx: &HostContext) -> Result<Box<dyn Mountable>> {
    let cart = Arc::clone(ctx.cart());
    Ok(Box::new(Checkout {
        bus: ctx.bus().clone(),
        summary: Arc::new(move || cart.snapshot()),
    }))
}

pub struct Checkout {
    bus: EventBus,
    summary: Summary,
}

impl Mountable for Checkout {
    fn mount(&self, container: &Container) -> Result<()> {
        render(container, &self.bus, &self.summary);

        for topic in [topics::CART_CHANGED, topics::ITEM_ADDED] {
            let target = container.clone();
            let bus = self.bus.clone();
            let summary = Arc::clone(&self.summary);
            let subscription = self.bus.subscribe(topic, move |_| {
                render(&target, &bus, &summary);
                Ok(())
            });
            container.on_clear(move || subscription.unsubscribe());
        }
        Ok(())
    }
}

fn render(container: &Container, bus: &EventBus, summary: &Summary) {
    let snapshot = summary();
    let mut nodes = vec![Node::text("title", "Checkout")];
    if snapshot.is_empty() {
        nodes.push(Node::text("summary", "Nothing to check out"));
        container.replace(nodes);
        return;
    }

    nodes.push(Node::text(
        "summary",
        format!(
            "{} item(s), {}",
            snapshot.total_items, snapshot.total_price
        ),
    ));

    let target = container.clone();
    let bus = bus.clone();
    let summary = Arc::clone(summary);
    nodes.push(Node::button("place-order", "Place order", move || {
        let current = summary();
        if current.is_empty() {
            render(&target, &bus, &summary);
            return;
        }
        let order = OrderPlaced {
            total_items: current.total_items,
            total_price: current.total_price,
        };
        match bus.publish_typed(topics::CHECKOUT_COMPLETED, &order) {
            Ok(_) => {
                info!(items = order.total_items, total = %order.total_price, "order placed");
                target.replace(vec![
                    Node::text("title", "Checkout"),
                    Node::text("done", "Thank you for your order!"),
                ]);
            }
            Err(e) => warn!(error = %e, "checkout-completed not published"),
        }
    }));
    container.replace(nodes);
}
