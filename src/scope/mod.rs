//! Shared dependency scope
//!
//! Process-wide registry deciding which instance of a "must be singleton"
//! library every fragment uses. The first declaration of a key supplies the
//! factory that builds the instance; later declarations only have their
//! version range checked against the resolved version.
//!
//! Ranges follow npm conventions: `^18.2.0`, `~1.4`, `>=1.0.0, <2.0.0`, and a
//! bare version such as `1.0.0` means exactly that version.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use semver::{Version, VersionReq};
use tracing::{debug, warn};

use crate::error::{self, HostError, Result};

/// A live shared instance, owned jointly by every fragment that resolved it
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

type Factory = Box<dyn FnOnce() -> SharedInstance + Send>;

/// A caller's own copy of a shared library: the version it was built
/// against and how to construct it if nobody else has
pub struct SharedProvision {
    version: Version,
    factory: Factory,
}

impl SharedProvision {
    /// Provision built from a factory producing a concrete type
    pub fn of<T, F>(version: Version, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            version,
            factory: Box::new(move || Arc::new(factory()) as SharedInstance),
        }
    }

    /// Provision wrapping an instance that already exists
    pub fn instance(version: Version, instance: SharedInstance) -> Self {
        Self {
            version,
            factory: Box::new(move || instance),
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Debug for SharedProvision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedProvision")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// One resolved shared dependency
#[derive(Clone)]
pub struct SharedDependencyEntry {
    pub dependency_key: String,
    /// Range of the declaration that won
    pub required_version_range: VersionReq,
    pub resolved_version: Version,
    pub resolved_instance: SharedInstance,
}

impl fmt::Debug for SharedDependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDependencyEntry")
            .field("dependency_key", &self.dependency_key)
            .field("required_version_range", &self.required_version_range)
            .field("resolved_version", &self.resolved_version)
            .finish_non_exhaustive()
    }
}

/// Registry of shared singleton dependencies
///
/// Entries live as long as the scope; there is no teardown.
#[derive(Default)]
pub struct SharedScope {
    entries: Mutex<HashMap<String, SharedDependencyEntry>>,
}

impl SharedScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedDependencyEntry>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Declare a shared dependency, returning the instance every caller shares
    ///
    /// The provision's factory runs only when the key has never been declared.
    pub fn declare(
        &self,
        key: &str,
        version_range: &VersionReq,
        provision: SharedProvision,
    ) -> Result<SharedInstance> {
        if let Some(existing) = self.lookup_compatible(key, version_range)? {
            return Ok(existing);
        }

        if !version_range.matches(&provision.version) {
            warn!(
                key,
                range = %version_range,
                version = %provision.version,
                "shared provision does not satisfy its own range"
            );
            return Err(error::shared_dependency_conflict(
                key,
                version_range.to_string(),
                provision.version.to_string(),
            ));
        }

        let SharedProvision { version, factory } = provision;
        // Built outside the lock so a factory may itself use the scope.
        let instance = factory();

        let mut entries = self.lock();
        if let Some(entry) = entries.get(key) {
            // Another declaration won while the factory ran.
            return check_compatible(entry, version_range);
        }
        debug!(key, version = %version, "shared dependency resolved");
        entries.insert(
            key.to_string(),
            SharedDependencyEntry {
                dependency_key: key.to_string(),
                required_version_range: version_range.clone(),
                resolved_version: version,
                resolved_instance: Arc::clone(&instance),
            },
        );
        Ok(instance)
    }

    /// Join an already declared dependency without bringing a copy of it
    pub fn require(&self, key: &str, version_range: &VersionReq) -> Result<SharedInstance> {
        self.lookup_compatible(key, version_range)?
            .ok_or_else(|| error::dependency_not_declared(key))
    }

    /// Whether `key` is declared, failing when its version is outside `version_range`
    pub fn satisfies(&self, key: &str, version_range: &VersionReq) -> Result<bool> {
        self.lookup_compatible(key, version_range)
            .map(|instance| instance.is_some())
    }

    fn lookup_compatible(
        &self,
        key: &str,
        version_range: &VersionReq,
    ) -> Result<Option<SharedInstance>> {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) => check_compatible(entry, version_range).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve the instance of a declared dependency
    pub fn resolve(&self, key: &str) -> Result<SharedInstance> {
        self.lock()
            .get(key)
            .map(|entry| Arc::clone(&entry.resolved_instance))
            .ok_or_else(|| error::dependency_not_declared(key))
    }

    /// Resolve a declared dependency as a concrete type
    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        self.resolve(key)?
            .downcast::<T>()
            .map_err(|_| error::shared_type_mismatch(key, type_name::<T>()))
    }

    /// Version the key resolved to, if declared
    pub fn resolved_version(&self, key: &str) -> Option<Version> {
        self.lock()
            .get(key)
            .map(|entry| entry.resolved_version.clone())
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Snapshot of all entries, sorted by key
    pub fn entries(&self) -> Vec<SharedDependencyEntry> {
        let mut entries: Vec<_> = self.lock().values().cloned().collect();
        entries.sort_by(|a, b| a.dependency_key.cmp(&b.dependency_key));
        entries
    }
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedScope")
            .field("entries", &self.entries())
            .finish()
    }
}

fn check_compatible(
    entry: &SharedDependencyEntry,
    version_range: &VersionReq,
) -> Result<SharedInstance> {
    if version_range.matches(&entry.resolved_version) {
        debug!(
            key = %entry.dependency_key,
            range = %version_range,
            version = %entry.resolved_version,
            "reusing shared dependency"
        );
        Ok(Arc::clone(&entry.resolved_instance))
    } else {
        warn!(
            key = %entry.dependency_key,
            range = %version_range,
            version = %entry.resolved_version,
            "shared dependency conflict"
        );
        Err(error::shared_dependency_conflict(
            entry.dependency_key.clone(),
            version_range.to_string(),
            entry.resolved_version.to_string(),
        ))
    }
}

/// Parse a concrete version such as `18.2.0`
pub fn parse_version(input: &str) -> Result<Version> {
    Version::parse(input.trim()).map_err(|e| HostError::InvalidVersion {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Parse an npm-style version range
///
/// A bare version pins exactly; everything else uses semver requirement syntax.
pub fn parse_range(input: &str) -> Result<VersionReq> {
    let trimmed = input.trim();
    let normalized = if Version::parse(trimmed).is_ok() {
        format!("={trimmed}")
    } else {
        trimmed.to_string()
    };
    VersionReq::parse(&normalized).map_err(|e| HostError::InvalidVersion {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    fn r(s: &str) -> VersionReq {
        parse_range(s).unwrap()
    }

    #[derive(Debug)]
    struct Store(&'static str);

    #[test]
    fn test_first_declaration_builds_instance() {
        let scope = SharedScope::new();
        let instance = scope
            .declare(
                "store",
                &r("^1.0.0"),
                SharedProvision::of(v("1.2.0"), || Store("host")),
            )
            .unwrap();
        assert_eq!(instance.downcast_ref::<Store>().unwrap().0, "host");
        assert_eq!(scope.resolved_version("store"), Some(v("1.2.0")));
    }

    #[test]
    fn test_compatible_declaration_never_invokes_factory() {
        let scope = SharedScope::new();
        let calls = Arc::new(AtomicUsize::new(0));

        scope
            .declare(
                "store",
                &r("^1.0.0"),
                SharedProvision::of(v("1.2.0"), || Store("f")),
            )
            .unwrap();

        let counter = Arc::clone(&calls);
        let second = scope
            .declare(
                "store",
                &r("^1.1.0"),
                SharedProvision::of(v("1.5.0"), move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Store("g")
                }),
            )
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.downcast_ref::<Store>().unwrap().0, "f");
        assert_eq!(scope.resolve_as::<Store>("store").unwrap().0, "f");
    }

    #[test]
    fn test_incompatible_declaration_conflicts() {
        let scope = SharedScope::new();
        scope
            .declare(
                "react",
                &r("^18.2.0"),
                SharedProvision::of(v("18.2.0"), || Store("react18")),
            )
            .unwrap();

        let err = scope
            .declare(
                "react",
                &r("^17.0.0"),
                SharedProvision::of(v("17.0.2"), || Store("react17")),
            )
            .unwrap_err();

        match err {
            HostError::SharedDependencyConflict {
                key,
                required_by_caller,
                resolved_version,
            } => {
                assert_eq!(key, "react");
                assert_eq!(required_by_caller, "^17.0.0");
                assert_eq!(resolved_version, "18.2.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The winner is untouched
        assert_eq!(scope.resolve_as::<Store>("react").unwrap().0, "react18");
    }

    #[test]
    fn test_provision_outside_own_range_conflicts() {
        let scope = SharedScope::new();
        let err = scope
            .declare(
                "react",
                &r("^18.0.0"),
                SharedProvision::of(v("17.0.0"), || Store("old")),
            )
            .unwrap_err();
        assert!(matches!(err, HostError::SharedDependencyConflict { .. }));
        assert!(!scope.is_declared("react"));
    }

    #[test]
    fn test_resolve_undeclared_fails() {
        let scope = SharedScope::new();
        assert!(matches!(
            scope.resolve("missing"),
            Err(HostError::DependencyNotDeclared { .. })
        ));
    }

    #[test]
    fn test_require_checks_range() {
        let scope = SharedScope::new();
        assert!(matches!(
            scope.require("store", &r("^1.0.0")),
            Err(HostError::DependencyNotDeclared { .. })
        ));

        scope
            .declare(
                "store",
                &r("1.0.0"),
                SharedProvision::of(v("1.0.0"), || Store("host")),
            )
            .unwrap();
        assert!(scope.require("store", &r("^1.0.0")).is_ok());
        assert!(matches!(
            scope.require("store", &r("^2.0.0")),
            Err(HostError::SharedDependencyConflict { .. })
        ));
    }

    #[test]
    fn test_resolve_as_wrong_type() {
        let scope = SharedScope::new();
        scope
            .declare(
                "store",
                &r("^1.0.0"),
                SharedProvision::of(v("1.0.0"), || Store("host")),
            )
            .unwrap();
        assert!(matches!(
            scope.resolve_as::<String>("store"),
            Err(HostError::SharedTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_factory_may_use_scope() {
        let scope = Arc::new(SharedScope::new());
        let inner = Arc::clone(&scope);
        scope
            .declare(
                "outer",
                &r("^1.0.0"),
                SharedProvision::of(v("1.0.0"), move || {
                    inner
                        .declare(
                            "inner",
                            &r("^1.0.0"),
                            SharedProvision::of(v("1.0.0"), || Store("inner")),
                        )
                        .unwrap();
                    Store("outer")
                }),
            )
            .unwrap();
        assert!(scope.is_declared("inner"));
        assert_eq!(scope.entries().len(), 2);
    }

    #[test]
    fn test_bare_version_range_is_exact() {
        let range = r("1.0.0");
        assert!(range.matches(&v("1.0.0")));
        assert!(!range.matches(&v("1.0.1")));
        assert!(r("^1.0.0").matches(&v("1.9.0")));
    }

    #[test]
    fn test_parse_invalid_range() {
        assert!(matches!(
            parse_range("not a range"),
            Err(HostError::InvalidVersion { .. })
        ));
        assert!(parse_version("18").is_err());
    }
}
