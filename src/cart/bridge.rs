//! Event bus wiring for the cart
//!
//! Fragments that do not hold the store publish `add-to-cart` requests
//! carrying a catalog [`Product`]. The bridge applies them to the store,
//! announces `item-added` and shows a notification. `checkout-completed`
//! empties the cart. Every store mutation, whoever made it, is announced as
//! `cart-changed` so fragments without the store stay in agreement.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CartStore, ProductId};
use crate::bus::{EventBus, topics};
use crate::catalog::Product;
use crate::notification::NotificationCenter;
use crate::subscription::Subscription;

/// Payload of `item-added`
///
/// Besides the product id it carries the line's resulting quantity, so
/// subscribers need not read the store to learn it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub id: ProductId,
    pub quantity: u32,
}

/// Subscriptions tying a cart store to a bus
#[derive(Debug)]
pub struct CartBridge {
    subscriptions: Vec<Subscription>,
}

impl CartBridge {
    /// Start forwarding bus requests into `store`
    pub fn connect(
        bus: &EventBus,
        store: Arc<CartStore>,
        notifications: NotificationCenter,
    ) -> Self {
        let add_store = Arc::clone(&store);
        let add_bus = bus.clone();
        let on_add = bus.subscribe_typed(topics::ADD_TO_CART, move |product: Product| {
            let details = product.to_item_details();
            let id = details.id;
            let quantity = add_store.add_item(details);
            notifications.show(format!("{} added to cart!", product.title));
            add_bus.publish_typed(topics::ITEM_ADDED, &ItemAdded { id, quantity })?;
            Ok(())
        });

        let clear_store = Arc::clone(&store);
        let on_checkout = bus.subscribe(topics::CHECKOUT_COMPLETED, move |_| {
            let cleared = clear_store.clear();
            tracing::info!(lines = cleared, "cart cleared after checkout");
            Ok(())
        });

        let change_bus = bus.clone();
        let on_change = store.subscribe(move |snapshot| {
            if let Err(e) = change_bus.publish_typed(topics::CART_CHANGED, snapshot) {
                tracing::warn!(error = %e, "cart-changed not published");
            }
        });

        Self {
            subscriptions: vec![on_add, on_checkout, on_change],
        }
    }

    /// Stop forwarding; safe to call more than once
    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
