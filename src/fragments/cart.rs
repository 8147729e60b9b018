//! Cart lines, totals and quantity controls
//!
//! Subscribes to the shared cart store and re-renders on every change.
//! The subscription is released when the host clears the container.

use std::sync::{Arc, Weak};

use super::RUNTIME_RANGE;
use crate::cart::{CartSnapshot, CartStore};
use crate::context::HostContext;
use crate::error::Result;
use crate::mount::{Container, Mountable, Node};

/// Linked entry of `cart/ShoppingCart`
pub fn instantiate(ctx: &HostContext) -> Result<Box<dyn Mountable>> {
    let runtime = ctx.require_runtime(RUNTIME_RANGE)?;
    Ok(Box::new(ShoppingCart {
        store: Arc::clone(&runtime.cart),
    }))
}

pub struct ShoppingCart {
    store: Arc<CartStore>,
}

impl Mountable for ShoppingCart {
    fn mount(&self, container: &Container) -> Result<()> {
        let store = Arc::downgrade(&self.store);
        container.replace(render(&self.store.snapshot(), &store));

        let target = container.clone();
        let subscription = self.store.subscribe(move |snapshot| {
            target.replace(render(snapshot, &store));
        });
        container.on_clear(move || subscription.unsubscribe());
        Ok(())
    }
}

fn render(snapshot: &CartSnapshot, store: &Weak<CartStore>) -> Vec<Node> {
    let mut nodes = vec![Node::text("title", "Shopping Cart")];
    if snapshot.is_empty() {
        nodes.push(Node::text("empty", "Your cart is empty"));
        return nodes;
    }

    for item in &snapshot.items {
        let id = item.id;
        nodes.push(Node::text(
            format!("line-{id}"),
            format!(
                "{} x{} @ {} = {}",
                item.name,
                item.quantity,
                item.unit_price,
                item.line_total()
            ),
        ));

        let quantity = i64::from(item.quantity);
        nodes.push(button(store, format!("dec-{id}"), "-", move |cart| {
            cart.update_quantity(id, quantity - 1);
        }));
        nodes.push(button(store, format!("inc-{id}"), "+", move |cart| {
            cart.update_quantity(id, quantity + 1);
        }));
        nodes.push(button(store, format!("remove-{id}"), "Remove", move |cart| {
            cart.remove_item(id);
        }));
    }

    nodes.push(Node::text(
        "total-items",
        format!("Total items: {}", snapshot.total_items),
    ));
    nodes.push(Node::text(
        "total-price",
        format!("Total: {}", snapshot.total_price),
    ));
    nodes
}

fn button(
    store: &Weak<CartStore>,
    key: String,
    label: &str,
    action: impl Fn(&CartStore) + Send + Sync + 'static,
) -> Node {
    let store = Weak::clone(store);
    Node::button(key, label, move || {
        if let Some(cart) = store.upgrade() {
            action(&cart);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{ItemDetails, Money, ProductId};
    use crate::notification::DEFAULT_TIMEOUT;

    fn lamp() -> ItemDetails {
        ItemDetails::new(1, "Lamp", Money::from_cents(2500), "lamp.png")
    }

    fn mounted() -> (HostContext, Container) {
        let ctx = HostContext::new(DEFAULT_TIMEOUT).unwrap();
        let container = Container::new("cart");
        instantiate(&ctx).unwrap().mount(&container).unwrap();
        (ctx, container)
    }

    #[test]
    fn test_renders_empty_cart() {
        let (_ctx, container) = mounted();
        assert_eq!(container.render(), "Shopping Cart\nYour cart is empty");
    }

    #[test]
    fn test_rerenders_on_store_change() {
        let (ctx, container) = mounted();
        ctx.cart().add_item(lamp());
        ctx.cart().add_item(lamp());

        let rendered = container.render();
        assert!(rendered.contains("Lamp x2 @ $25.00 = $50.00"));
        assert!(rendered.contains("Total items: 2"));
        assert!(rendered.contains("Total: $50.00"));
    }

    #[test]
    fn test_quantity_buttons() {
        let (ctx, container) = mounted();
        ctx.cart().add_item(lamp());

        assert!(container.click("inc-1"));
        assert_eq!(ctx.cart().get(ProductId(1)).unwrap().quantity, 2);
        assert!(container.click("dec-1"));
        assert!(container.click("dec-1"));
        assert!(ctx.cart().get(ProductId(1)).is_none());
        assert!(container.render().contains("Your cart is empty"));
    }

    #[test]
    fn test_remove_button() {
        let (ctx, container) = mounted();
        ctx.cart().add_item(lamp());
        assert!(container.click("remove-1"));
        assert!(ctx.cart().items().is_empty());
    }

    #[test]
    fn test_clear_releases_subscription() {
        let (ctx, container) = mounted();
        assert_eq!(ctx.cart().listener_count(), 1);

        container.clear();
        assert_eq!(ctx.cart().listener_count(), 0);
        ctx.cart().add_item(lamp());
        assert!(container.is_empty());
    }
}
