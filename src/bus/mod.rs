//! Cross-fragment event bus
//!
//! Topic-keyed publish/subscribe for fragments that share no state. Delivery
//! is synchronous and in-process: `publish` returns after every current
//! subscriber of the topic has run, in subscription order. Nothing is
//! persisted, so a subscriber added after a publish never sees it.
//!
//! Each handler runs isolated: an error or panic is handed to the bus's
//! [`ErrorReporter`] and delivery continues with the next handler.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HostError, Result};
use crate::subscription::Subscription;

pub mod reporter;

pub use reporter::{CollectingReporter, ErrorReporter, HandlerFailure, TracingReporter};

/// Error a handler may return
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = dyn Fn(&EventEnvelope) -> std::result::Result<(), HandlerError> + Send + Sync;

/// Well-known topics exchanged by the built-in fragments
pub mod topics {
    /// A fragment asks for a product to be put in the cart
    pub const ADD_TO_CART: &str = "add-to-cart";
    /// The cart accepted an item; payload `{ "id": .., "quantity": .. }`
    pub const ITEM_ADDED: &str = "item-added";
    /// Any cart mutation; payload is the cart snapshot after it
    pub const CART_CHANGED: &str = "cart-changed";
    /// Checkout finished; the cart should be emptied
    pub const CHECKOUT_COMPLETED: &str = "checkout-completed";
}

/// A published event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub topic: String,
    pub payload: Value,
}

struct Subscriber {
    id: u64,
    active: AtomicBool,
    handler: Box<Handler>,
}

struct BusInner {
    topics: Mutex<HashMap<String, Vec<Arc<Subscriber>>>>,
    next_id: AtomicU64,
    reporter: Arc<dyn ErrorReporter>,
}

impl BusInner {
    fn topics(&self) -> MutexGuard<'_, HashMap<String, Vec<Arc<Subscriber>>>> {
        self.topics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Publish/subscribe channel; clones share the same subscribers
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Bus reporting handler failures through `tracing`
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                topics: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                reporter,
            }),
        }
    }

    /// Deliver `payload` to every current subscriber of `topic`
    ///
    /// Returns the number of handlers that ran without failing.
    pub fn publish(&self, topic: &str, payload: Value) -> usize {
        let envelope = EventEnvelope {
            topic: topic.to_string(),
            payload,
        };

        // Snapshot so handlers may publish or subscribe re-entrantly.
        let subscribers: Vec<Arc<Subscriber>> = self
            .inner
            .topics()
            .get(topic)
            .cloned()
            .unwrap_or_default();

        tracing::trace!(topic, subscribers = subscribers.len(), "publish");

        let mut delivered = 0;
        for subscriber in subscribers {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscriber.handler)(&envelope)));
            let failure = match outcome {
                Ok(Ok(())) => {
                    delivered += 1;
                    continue;
                }
                Ok(Err(err)) => HandlerFailure::Error(err),
                Err(panic) => HandlerFailure::from_panic(panic),
            };
            self.inner.reporter.report(&envelope, &failure);
        }
        delivered
    }

    /// Serialize `payload` and publish it
    pub fn publish_typed<T: Serialize>(&self, topic: &str, payload: &T) -> Result<usize> {
        let value = serde_json::to_value(payload).map_err(|e| HostError::PayloadEncoding {
            topic: topic.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.publish(topic, value))
    }

    /// Register `handler` for `topic`
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Subscription
    where
        F: Fn(&EventEnvelope) -> std::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            handler: Box::new(handler),
        });

        self.inner
            .topics()
            .entry(topic.to_string())
            .or_default()
            .push(Arc::clone(&subscriber));

        let bus: Weak<BusInner> = Arc::downgrade(&self.inner);
        let topic = topic.to_string();
        Subscription::new(move || {
            subscriber.active.store(false, Ordering::Release);
            if let Some(bus) = bus.upgrade() {
                let mut topics = bus.topics();
                if let Some(list) = topics.get_mut(&topic) {
                    list.retain(|s| s.id != subscriber.id);
                    if list.is_empty() {
                        topics.remove(&topic);
                    }
                }
            }
        })
    }

    /// Register a handler receiving the payload decoded as `T`
    ///
    /// A payload that does not decode is reported as a handler failure.
    pub fn subscribe_typed<T, F>(&self, topic: &str, handler: F) -> Subscription
    where
        T: DeserializeOwned,
        F: Fn(T) -> std::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(topic, move |envelope| {
            let payload = T::deserialize(&envelope.payload)?;
            handler(payload)
        })
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner.topics().get(topic).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: Vec<String> = self.inner.topics().keys().cloned().collect();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}
