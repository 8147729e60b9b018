//! The shared cart store
//!
//! Every mutation runs to completion under the store's lock and leaves the
//! item list with unique ids and no zero quantities. Listeners are called
//! after the lock is released, so they may read or mutate the store again.
//! Each listener receives the cart as it is when that listener runs, so the
//! last state every listener sees is the store's current state even when an
//! earlier listener mutated it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use tracing::{debug, error};

use super::{CartItem, ItemDetails, Money, ProductId};
use crate::subscription::Subscription;

/// Read-only view of the cart at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_price: Money,
}

impl CartSnapshot {
    fn of(items: &[CartItem]) -> Self {
        Self {
            items: items.to_vec(),
            total_items: total_items(items),
            total_price: total_price(items),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

type Listener = dyn Fn(&CartSnapshot) + Send + Sync;

struct ListenerSlot {
    id: u64,
    active: AtomicBool,
    listener: Box<Listener>,
}

#[derive(Default)]
struct Listeners {
    slots: Mutex<Vec<Arc<ListenerSlot>>>,
    next_id: AtomicU64,
}

impl Listeners {
    fn slots(&self) -> MutexGuard<'_, Vec<Arc<ListenerSlot>>> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Cart contents shared by every fragment
#[derive(Default)]
pub struct CartStore {
    items: Mutex<Vec<CartItem>>,
    listeners: Arc<Listeners>,
}

impl CartStore {
    /// Empty cart
    pub fn new() -> Self {
        Self::default()
    }

    fn items_mut(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add one unit of a product
    ///
    /// An id already in the cart only has its quantity raised by one; the
    /// name, price and image of the first insertion are kept. Returns the
    /// resulting quantity.
    pub fn add_item(&self, details: ItemDetails) -> u32 {
        let quantity = {
            let mut items = self.items_mut();
            if let Some(existing) = items.iter_mut().find(|i| i.id == details.id) {
                existing.quantity = existing.quantity.saturating_add(1);
                existing.quantity
            } else {
                items.push(CartItem::first(details));
                1
            }
        };
        self.notify();
        quantity
    }

    /// Set the quantity of an item; zero or less removes it
    ///
    /// Unknown ids are ignored. Returns whether the cart changed.
    pub fn update_quantity(&self, id: ProductId, new_quantity: i64) -> bool {
        if new_quantity <= 0 {
            return self.remove_item(id).is_some();
        }
        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);

        {
            let mut items = self.items_mut();
            let Some(item) = items.iter_mut().find(|i| i.id == id) else {
                debug!(%id, "quantity update for item not in cart");
                return false;
            };
            if item.quantity == quantity {
                return false;
            }
            item.quantity = quantity;
        }
        self.notify();
        true
    }

    /// Remove an item; unknown ids are ignored
    pub fn remove_item(&self, id: ProductId) -> Option<CartItem> {
        let removed = {
            let mut items = self.items_mut();
            let position = items.iter().position(|i| i.id == id)?;
            items.remove(position)
        };
        self.notify();
        Some(removed)
    }

    /// Empty the cart (checkout or explicit clear); returns the removed line count
    pub fn clear(&self) -> usize {
        let removed = {
            let mut items = self.items_mut();
            std::mem::take(&mut *items).len()
        };
        if removed > 0 {
            self.notify();
        }
        removed
    }

    /// Current items in insertion order
    pub fn items(&self) -> Vec<CartItem> {
        self.items_mut().clone()
    }

    pub fn get(&self, id: ProductId) -> Option<CartItem> {
        self.items_mut().iter().find(|i| i.id == id).cloned()
    }

    /// Sum of all quantities
    pub fn total_items(&self) -> u64 {
        total_items(&self.items_mut())
    }

    /// Sum of `unit_price * quantity`, computed on every call
    pub fn total_price(&self) -> Money {
        total_price(&self.items_mut())
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::of(&self.items_mut())
    }

    /// Call `listener` after every mutation with the cart's current state
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        let slot = Arc::new(ListenerSlot {
            id: self.listeners.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            listener: Box::new(listener),
        });
        self.listeners.slots().push(Arc::clone(&slot));

        let listeners: Weak<Listeners> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            slot.active.store(false, Ordering::Release);
            if let Some(listeners) = listeners.upgrade() {
                listeners.slots().retain(|s| s.id != slot.id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.slots().len()
    }

    fn notify(&self) {
        let slots: Vec<Arc<ListenerSlot>> = self.listeners.slots().clone();
        for slot in slots {
            // Unsubscribed by an earlier listener of this round
            if !slot.active.load(Ordering::Acquire) {
                continue;
            }
            let snapshot = self.snapshot();
            if catch_unwind(AssertUnwindSafe(|| (slot.listener)(&snapshot))).is_err() {
                error!(listener = slot.id, "cart listener panicked");
            }
        }
    }
}

fn total_items(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity)).sum()
}

fn total_price(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
