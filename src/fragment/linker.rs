//! Statically linked fragment implementations
//!
//! Code cannot be loaded at run time here, so every exposed module a host
//! can mount is linked in ahead of time and looked up by
//! `(fragment, module)`. Loading a fragment binds its fetched manifest to
//! these entries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::HostContext;
use crate::error::Result;
use crate::mount::Mountable;
use crate::scope::SharedProvision;

/// Constructor of one exposed module
pub trait FragmentEntry: Send + Sync {
    /// Build a mountable instance wired to the host context
    fn instantiate(&self, ctx: &HostContext) -> Result<Box<dyn Mountable>>;

    /// The fragment's own copy of a shared dependency, if it bundles one
    ///
    /// Only used when no other declaration of `key` exists yet.
    fn provision(&self, key: &str) -> Option<SharedProvision> {
        let _ = key;
        None
    }
}

impl<F> FragmentEntry for F
where
    F: Fn(&HostContext) -> Result<Box<dyn Mountable>> + Send + Sync,
{
    fn instantiate(&self, ctx: &HostContext) -> Result<Box<dyn Mountable>> {
        self(ctx)
    }
}

/// Registry of linked entries keyed by fragment and module name
#[derive(Clone, Default)]
pub struct ModuleLinker {
    entries: BTreeMap<(String, String), Arc<dyn FragmentEntry>>,
}

impl ModuleLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `entry` as `fragment/module`, replacing any earlier link
    pub fn link(
        mut self,
        fragment: impl Into<String>,
        module: impl Into<String>,
        entry: impl FragmentEntry + 'static,
    ) -> Self {
        self.entries
            .insert((fragment.into(), module.into()), Arc::new(entry));
        self
    }

    pub fn resolve(&self, fragment: &str, module: &str) -> Option<Arc<dyn FragmentEntry>> {
        self.entries
            .get(&(fragment.to_string(), module.to_string()))
            .cloned()
    }

    /// Module names linked for `fragment`
    pub fn modules_of(&self, fragment: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|(f, _)| f == fragment)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ModuleLinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .entries
            .keys()
            .map(|(fragment, module)| format!("{fragment}/{module}"))
            .collect();
        f.debug_struct("ModuleLinker").field("entries", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::Container;

    struct Blank;

    impl Mountable for Blank {
        fn mount(&self, _container: &Container) -> Result<()> {
            Ok(())
        }
    }

    fn blank(_: &HostContext) -> Result<Box<dyn Mountable>> {
        Ok(Box::new(Blank))
    }

    #[test]
    fn test_link_and_resolve() {
        let linker = ModuleLinker::new()
            .link("catalog", "ProductCatalog", blank)
            .link("cart", "ShoppingCart", blank)
            .link("cart", "CartBadge", blank);

        assert_eq!(linker.len(), 3);
        assert!(linker.resolve("catalog", "ProductCatalog").is_some());
        assert!(linker.resolve("catalog", "ShoppingCart").is_none());
        assert_eq!(linker.modules_of("cart"), vec!["CartBadge", "ShoppingCart"]);
    }

    #[test]
    fn test_closure_entry_has_no_provision() {
        let linker = ModuleLinker::new().link("cart", "ShoppingCart", blank);
        let entry = linker.resolve("cart", "ShoppingCart").unwrap();
        assert!(entry.provision("react").is_none());
    }
}
