//! Subscription handles returned by the event bus and the cart store

use std::fmt;
use std::sync::Mutex;

type Release = Box<dyn FnOnce() + Send>;

/// Handle that detaches a subscriber
///
/// Dropping the handle keeps the subscription alive; call [`unsubscribe`]
/// to detach. Unsubscribing is idempotent and stays safe after the
/// publisher has been dropped.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    release: Mutex<Option<Release>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// Detach the subscriber; later calls do nothing
    pub fn unsubscribe(&self) {
        let release = self
            .release
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(release) = release {
            release();
        }
    }

    pub fn is_active(&self) -> bool {
        self.release
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
