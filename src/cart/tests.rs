use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use super::*;
use crate::bus::{CollectingReporter, ErrorReporter, EventBus, topics};
use crate::catalog::Product;
use crate::cart::bridge::ItemAdded;
use crate::notification::NotificationCenter;

fn details(id: u64, name: &str, cents: i64) -> ItemDetails {
    ItemDetails::new(id, name, Money::from_cents(cents), format!("{id}.png"))
}

#[test]
fn test_add_same_id_twice_keeps_first_details() {
    let store = CartStore::new();
    assert_eq!(store.add_item(details(1, "Lamp", 1000)), 1);
    assert_eq!(store.add_item(details(1, "Renamed Lamp", 2500)), 2);

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].name, "Lamp");
    assert_eq!(items[0].unit_price, Money::from_cents(1000));
    assert_eq!(items[0].image_ref, "1.png");
}

#[test]
fn test_add_preserves_insertion_order() {
    let store = CartStore::new();
    store.add_item(details(3, "c", 1));
    store.add_item(details(1, "a", 1));
    store.add_item(details(2, "b", 1));
    store.add_item(details(3, "c", 1));

    let ids: Vec<u64> = store.items().iter().map(|i| i.id.0).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_update_quantity_to_zero_removes_then_noop() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 1000));

    assert!(store.update_quantity(ProductId(1), 0));
    assert!(store.items().is_empty());
    assert!(!store.update_quantity(ProductId(1), 0));
    assert!(store.items().is_empty());
}

#[test]
fn test_update_quantity_negative_removes() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 1000));
    assert!(store.update_quantity(ProductId(1), -3));
    assert!(store.get(ProductId(1)).is_none());
}

#[test]
fn test_update_quantity_sets_value() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 1000));
    assert!(store.update_quantity(ProductId(1), 5));
    assert_eq!(store.get(ProductId(1)).unwrap().quantity, 5);
    assert_eq!(store.total_items(), 5);
}

#[test]
fn test_update_quantity_unknown_id_is_noop() {
    let store = CartStore::new();
    assert!(!store.update_quantity(ProductId(42), 3));
    assert!(store.items().is_empty());
}

#[test]
fn test_remove_item() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 1000));
    store.add_item(details(2, "Desk", 5000));

    let removed = store.remove_item(ProductId(1)).unwrap();
    assert_eq!(removed.name, "Lamp");
    assert!(store.remove_item(ProductId(1)).is_none());
    assert_eq!(store.items().len(), 1);
}

#[test]
fn test_totals() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 9999));
    store.add_item(details(1, "Lamp", 9999));
    store.add_item(details(2, "Desk", 14999));

    assert_eq!(store.total_items(), 3);
    assert_eq!(store.total_price(), Money::from_cents(9999 * 2 + 14999));
    assert_eq!(store.total_price().to_string(), "$349.97");
}

#[test]
fn test_clear() {
    let store = CartStore::new();
    store.add_item(details(1, "Lamp", 1));
    store.add_item(details(2, "Desk", 1));
    assert_eq!(store.clear(), 2);
    assert_eq!(store.clear(), 0);
    assert_eq!(store.total_items(), 0);
}

#[test]
fn test_listeners_notified_synchronously_on_each_mutation() {
    let store = CartStore::new();
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let sub = store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.total_items));

    store.add_item(details(1, "Lamp", 1));
    store.add_item(details(1, "Lamp", 1));
    store.update_quantity(ProductId(1), 5);
    store.update_quantity(ProductId(9), 5);
    store.remove_item(ProductId(1));

    assert_eq!(*counts.lock().unwrap(), vec![1, 2, 5, 0]);

    sub.unsubscribe();
    store.add_item(details(2, "Desk", 1));
    assert_eq!(counts.lock().unwrap().len(), 4);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_listener_may_mutate_store() {
    let store = Arc::new(CartStore::new());
    let inner = Arc::clone(&store);
    store.subscribe(move |snapshot| {
        // Cap every line at 2 units
        for item in &snapshot.items {
            if item.quantity > 2 {
                inner.update_quantity(item.id, 2);
            }
        }
    });

    for _ in 0..4 {
        store.add_item(details(1, "Lamp", 1));
    }
    assert_eq!(store.get(ProductId(1)).unwrap().quantity, 2);
}

#[test]
fn test_later_listener_ends_on_state_left_by_mutating_listener() {
    let store = Arc::new(CartStore::new());
    let inner = Arc::clone(&store);
    store.subscribe(move |snapshot| {
        for item in &snapshot.items {
            if item.quantity > 2 {
                inner.update_quantity(item.id, 2);
            }
        }
    });
    let badge = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&badge);
    store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.total_items));

    for _ in 0..3 {
        store.add_item(details(1, "Lamp", 1));
    }

    let seen = badge.lock().unwrap();
    assert_eq!(seen.last().copied(), Some(store.total_items()));
    assert_eq!(store.total_items(), 2);
    assert!(seen.iter().all(|&count| count <= 2));
}

#[test]
fn test_listener_unsubscribed_mid_round_is_skipped() {
    let store = CartStore::new();
    let later = Arc::new(Mutex::new(None::<crate::subscription::Subscription>));
    let to_cancel = Arc::clone(&later);
    store.subscribe(move |_| {
        if let Some(sub) = to_cancel.lock().unwrap().as_ref() {
            sub.unsubscribe();
        }
    });
    let hits = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&hits);
    let second = store.subscribe(move |_| *counter.lock().unwrap() += 1);
    *later.lock().unwrap() = Some(second);

    store.add_item(details(1, "Lamp", 1));
    assert_eq!(*hits.lock().unwrap(), 0);
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn test_panicking_listener_does_not_break_store() {
    let store = CartStore::new();
    store.subscribe(|_| panic!("listener failed"));
    store.add_item(details(1, "Lamp", 1));
    assert_eq!(store.total_items(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Update(u64, i64),
    Remove(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..6).prop_map(Op::Add),
        ((0u64..6), (-2i64..6)).prop_map(|(id, q)| Op::Update(id, q)),
        (0u64..6).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_ids_unique_and_totals_consistent(ops in proptest::collection::vec(op(), 0..64)) {
        let store = CartStore::new();
        for op in ops {
            match op {
                Op::Add(id) => { store.add_item(details(id, "p", 150)); }
                Op::Update(id, q) => { store.update_quantity(ProductId(id), q); }
                Op::Remove(id) => { store.remove_item(ProductId(id)); }
            }

            let items = store.items();
            let ids: HashSet<ProductId> = items.iter().map(|i| i.id).collect();
            prop_assert_eq!(ids.len(), items.len());
            prop_assert!(items.iter().all(|i| i.quantity >= 1));
            let sum: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
            prop_assert_eq!(store.total_items(), sum);
            prop_assert_eq!(store.total_price().cents(), i64::try_from(sum).unwrap() * 150);
        }
    }
}

#[test]
fn test_bridge_applies_add_to_cart_requests() {
    let reporter = Arc::new(CollectingReporter::new());
    let bus = EventBus::with_reporter(Arc::clone(&reporter) as Arc<dyn ErrorReporter>);
    let store = Arc::new(CartStore::new());
    let notifications = NotificationCenter::default();
    let bridge = CartBridge::connect(&bus, Arc::clone(&store), notifications.clone());

    let added = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&added);
    bus.subscribe_typed(topics::ITEM_ADDED, move |event: ItemAdded| {
        sink.lock().unwrap().push(event);
        Ok(())
    });

    let product = Product::new(7, "Chair", 49.5).with_image("chair.png");
    bus.publish_typed(topics::ADD_TO_CART, &product).unwrap();
    bus.publish_typed(topics::ADD_TO_CART, &product).unwrap();

    assert_eq!(store.get(ProductId(7)).unwrap().quantity, 2);
    assert_eq!(
        *added.lock().unwrap(),
        vec![
            ItemAdded { id: ProductId(7), quantity: 1 },
            ItemAdded { id: ProductId(7), quantity: 2 },
        ]
    );
    assert_eq!(notifications.current().message, "Chair added to cart!");
    assert!(reporter.failures().is_empty());

    bus.publish(topics::CHECKOUT_COMPLETED, serde_json::Value::Null);
    assert!(store.items().is_empty());

    assert_eq!(store.listener_count(), 1);
    bridge.detach();
    bridge.detach();
    assert_eq!(store.listener_count(), 0);
    bus.publish_typed(topics::ADD_TO_CART, &product).unwrap();
    assert!(store.items().is_empty());
}
