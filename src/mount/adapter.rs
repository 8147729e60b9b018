//! The mount contract every fragment satisfies
//!
//! The host never inspects how a fragment renders. Native fragments and
//! fragments built on a foreign UI framework alike expose one operation,
//! `mount(container)`, and are expected to release their own subscriptions
//! when the host clears the container.

use super::Container;
use crate::error::Result;

/// A fragment instance ready to attach to a host container
pub trait Mountable: Send + Sync {
    /// Render into `container`
    ///
    /// Called at most once per container acquisition. May start its own
    /// asynchronous startup, but must leave the container safe to clear.
    fn mount(&self, container: &Container) -> Result<()>;
}

impl<F> Mountable for F
where
    F: Fn(&Container) -> Result<()> + Send + Sync,
{
    fn mount(&self, container: &Container) -> Result<()> {
        self(container)
    }
}
