//! Single-slot user notifications
//!
//! At most one notification is active. Showing a new one replaces the
//! current message and restarts the timeout. Visibility is evaluated on
//! read against `tokio::time::Instant`, so no timer task is needed.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Default time a notification stays visible
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// What the notification region shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationState {
    pub message: String,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct Slot {
    message: String,
    hides_at: Option<Instant>,
}

/// Owner of the notification slot; clones share it
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    slot: Arc<Mutex<Slot>>,
    timeout: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl NotificationCenter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timeout,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Show `message`, superseding any visible notification
    pub fn show(&self, message: impl Into<String>) {
        let mut slot = self.slot();
        slot.message = message.into();
        slot.hides_at = Some(Instant::now() + self.timeout);
        tracing::debug!(message = %slot.message, "notification shown");
    }

    /// Hide the current notification before its timeout
    pub fn dismiss(&self) {
        self.slot().hides_at = None;
    }

    pub fn current(&self) -> NotificationState {
        let slot = self.slot();
        let visible = slot.hides_at.is_some_and(|at| Instant::now() < at);
        NotificationState {
            message: slot.message.clone(),
            visible,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
