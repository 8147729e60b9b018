//! Host context handed to every fragment
//!
//! One context exists per host process. It owns the shared dependency scope
//! and declares the host's shared runtime (cart store, event bus,
//! notifications) into it, so fragments reach the one cart through the
//! scope instead of through a global.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use semver::Version;

use crate::bus::EventBus;
use crate::cart::CartStore;
use crate::error::{self, Result};
use crate::notification::NotificationCenter;
use crate::scope::{SharedProvision, SharedScope, parse_range};

/// Scope key of the shared runtime
pub const SHARED_RUNTIME_KEY: &str = "@fragment-host/shared";

/// Version of the shared runtime this host provides
pub const SHARED_RUNTIME_VERSION: Version = Version::new(1, 0, 0);

/// State every fragment must see as a single instance
#[derive(Debug, Default)]
pub struct SharedRuntime {
    pub cart: Arc<CartStore>,
    pub bus: EventBus,
    pub notifications: NotificationCenter,
}

impl SharedRuntime {
    pub fn new(bus: EventBus, notifications: NotificationCenter) -> Self {
        Self {
            cart: Arc::new(CartStore::new()),
            bus,
            notifications,
        }
    }

    /// A fragment's own copy of the runtime, offered when it declares the key
    pub fn provision() -> SharedProvision {
        SharedProvision::of(SHARED_RUNTIME_VERSION, SharedRuntime::default)
    }
}

/// Dependency-injected context; clones share everything
#[derive(Clone)]
pub struct HostContext {
    scope: Arc<SharedScope>,
    runtime: Arc<SharedRuntime>,
}

impl HostContext {
    pub fn new(notification_timeout: Duration) -> Result<Self> {
        Self::with_bus(EventBus::new(), notification_timeout)
    }

    /// Context around an existing bus, e.g. one with a custom error reporter
    pub fn with_bus(bus: EventBus, notification_timeout: Duration) -> Result<Self> {
        let scope = Arc::new(SharedScope::new());
        let runtime = SharedRuntime::new(bus, NotificationCenter::new(notification_timeout));
        let range = parse_range(&SHARED_RUNTIME_VERSION.to_string())?;
        scope.declare(
            SHARED_RUNTIME_KEY,
            &range,
            SharedProvision::of(SHARED_RUNTIME_VERSION, move || runtime),
        )?;
        let runtime = scope.resolve_as::<SharedRuntime>(SHARED_RUNTIME_KEY)?;
        Ok(Self { scope, runtime })
    }

    pub fn scope(&self) -> &Arc<SharedScope> {
        &self.scope
    }

    pub fn runtime(&self) -> &Arc<SharedRuntime> {
        &self.runtime
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.runtime.cart
    }

    pub fn bus(&self) -> &EventBus {
        &self.runtime.bus
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.runtime.notifications
    }

    /// Resolve the shared runtime through the scope, checking `range`
    pub fn require_runtime(&self, range: &str) -> Result<Arc<SharedRuntime>> {
        let range = parse_range(range)?;
        self.scope
            .require(SHARED_RUNTIME_KEY, &range)?
            .downcast::<SharedRuntime>()
            .map_err(|_| error::shared_type_mismatch(SHARED_RUNTIME_KEY, "SharedRuntime"))
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("scope", &self.scope)
            .field("runtime", &self.runtime)
            .finish()
    }
}
