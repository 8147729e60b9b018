//! Fragment cache with single-flight loading
//!
//! Each registered name owns one cache slot. `load` on an `Unloaded` or
//! `Failed` slot starts an attempt on the runtime; callers arriving while it
//! runs await the same shared result. The attempt completes the slot itself,
//! so a caller that stops waiting does not cancel it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use semver::Version;
use tracing::{debug, info, warn};

use super::{
    FragmentDescriptor, FragmentEntry, FragmentManifest, LoadState, LoadedArtifact, LoadedFragment,
    ModuleHandle, ModuleLinker, RemoteFetcher,
};
use crate::error::{self, ErrorInfo, HostError, LoadFailureKind, Result};
use crate::hash;
use crate::scope::SharedScope;

type InFlight = Shared<BoxFuture<'static, LoadedFragment>>;

struct Slot {
    fragment: LoadedFragment,
    in_flight: Option<InFlight>,
}

struct RegistryInner {
    slots: Mutex<HashMap<String, Slot>>,
    fetcher: Arc<dyn RemoteFetcher>,
    linker: ModuleLinker,
    scope: Arc<SharedScope>,
}

/// Registry and loader of remote fragments; clones share the cache
#[derive(Clone)]
pub struct FragmentRegistry {
    inner: Arc<RegistryInner>,
}

impl FragmentRegistry {
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        linker: ModuleLinker,
        scope: Arc<SharedScope>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                slots: Mutex::new(HashMap::new()),
                fetcher,
                linker,
                scope,
            }),
        }
    }

    /// Register a fragment
    ///
    /// Registering an identical descriptor again is a no-op; a different
    /// descriptor under a registered name is rejected.
    pub fn register(&self, descriptor: FragmentDescriptor) -> Result<()> {
        let mut slots = self.inner.slots();
        if let Some(slot) = slots.get(&descriptor.name) {
            if slot.fragment.descriptor == descriptor {
                return Ok(());
            }
            return Err(error::config_invalid(format!(
                "Fragment '{}' is already registered with origin {}",
                descriptor.name, slot.fragment.descriptor.remote_origin
            )));
        }

        debug!(fragment = %descriptor, "registered fragment");
        slots.insert(
            descriptor.name.clone(),
            Slot {
                fragment: LoadedFragment::unloaded(descriptor),
                in_flight: None,
            },
        );
        Ok(())
    }

    /// Current cache entry of `name`, if registered
    pub fn get(&self, name: &str) -> Option<LoadedFragment> {
        self.inner
            .slots()
            .get(name)
            .map(|slot| slot.fragment.clone())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.slots().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn scope(&self) -> &Arc<SharedScope> {
        &self.inner.scope
    }

    /// Load `name`, joining an attempt already in flight
    ///
    /// Fails only for an unregistered name. A failed load is reported through
    /// the returned fragment's `load_state` and `error`.
    pub async fn load(&self, name: &str) -> Result<LoadedFragment> {
        let flight = {
            let mut slots = self.inner.slots();
            let slot = slots
                .get_mut(name)
                .ok_or_else(|| error::unknown_fragment(name))?;

            match (slot.fragment.load_state, &slot.in_flight) {
                (LoadState::Ready, _) => return Ok(slot.fragment.clone()),
                (LoadState::Loading, Some(flight)) => {
                    debug!(fragment = name, "joining in-flight load");
                    flight.clone()
                }
                _ => {
                    slot.fragment.load_state = LoadState::Loading;
                    slot.fragment.error = None;
                    slot.fragment.attempts += 1;
                    info!(
                        fragment = name,
                        attempt = slot.fragment.attempts,
                        "loading fragment"
                    );
                    let flight = start(
                        Arc::clone(&self.inner),
                        slot.fragment.descriptor.clone(),
                    );
                    slot.in_flight = Some(flight.clone());
                    flight
                }
            }
        };

        Ok(flight.await)
    }
}

impl fmt::Debug for FragmentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentRegistry")
            .field("fragments", &self.names())
            .field("linker", &self.inner.linker)
            .finish_non_exhaustive()
    }
}

/// Spawn one attempt and wrap its completion for sharing
fn start(inner: Arc<RegistryInner>, descriptor: FragmentDescriptor) -> InFlight {
    let task_inner = Arc::clone(&inner);
    let task_descriptor = descriptor.clone();
    let task = tokio::spawn(async move {
        let outcome = AssertUnwindSafe(task_inner.attempt(&task_descriptor))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(HostError::IoError {
                    message: "fragment load panicked".to_string(),
                })
            });
        task_inner.complete(&task_descriptor, outcome)
    });

    async move {
        match task.await {
            Ok(fragment) => fragment,
            // Only reachable when the runtime shuts down mid-load.
            Err(join_error) => inner.complete(
                &descriptor,
                Err(HostError::IoError {
                    message: format!("fragment load aborted: {join_error}"),
                }),
            ),
        }
    }
    .boxed()
    .shared()
}

impl RegistryInner {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record the outcome of an attempt and release waiting callers
    fn complete(
        &self,
        descriptor: &FragmentDescriptor,
        outcome: Result<Arc<ModuleHandle>>,
    ) -> LoadedFragment {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(&descriptor.name) else {
            return LoadedFragment::unloaded(descriptor.clone());
        };
        if slot.fragment.load_state != LoadState::Loading {
            // The task already recorded this attempt.
            return slot.fragment.clone();
        }

        slot.in_flight = None;
        match outcome {
            Ok(module) => {
                info!(fragment = %descriptor.name, "fragment ready");
                slot.fragment.module = Some(module);
                slot.fragment.load_state = LoadState::Ready;
                slot.fragment.error = None;
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                warn!(
                    fragment = %descriptor.name,
                    kind = ?info.kind,
                    error = %info.message,
                    "fragment load failed"
                );
                slot.fragment.module = None;
                slot.fragment.load_state = LoadState::Failed;
                slot.fragment.error = Some(info);
            }
        }
        slot.fragment.clone()
    }

    async fn attempt(&self, descriptor: &FragmentDescriptor) -> Result<Arc<ModuleHandle>> {
        let name = descriptor.name.as_str();

        let manifest_url = descriptor.manifest_url()?;
        let bytes = self
            .fetcher
            .fetch(&manifest_url)
            .await
            .map_err(|e| {
                error::fragment_load_failed(name, LoadFailureKind::Network, e.to_string())
            })?;
        let manifest = FragmentManifest::parse(name, &bytes)?;

        let mut entries = BTreeMap::new();
        for module in manifest.exposed_modules() {
            let entry = self.linker.resolve(name, module).ok_or_else(|| {
                error::fragment_load_failed(
                    name,
                    LoadFailureKind::Unlinked,
                    format!("exposed module '{module}' has no linked implementation"),
                )
            })?;
            entries.insert(module.to_string(), entry);
        }

        let mut artifacts = Vec::with_capacity(manifest.artifacts.len());
        for artifact in &manifest.artifacts {
            let url = descriptor.resolve(&artifact.path)?;
            let bytes = self.fetcher.fetch(&url).await.map_err(|e| {
                error::fragment_load_failed(name, LoadFailureKind::Network, e.to_string())
            })?;
            if let Some(digest) = &artifact.digest {
                if !hash::verify_bytes(&bytes, digest) {
                    return Err(error::fragment_load_failed(
                        name,
                        LoadFailureKind::Integrity,
                        format!(
                            "artifact '{}' does not match digest {digest} (got {})",
                            artifact.path,
                            hash::hash_bytes(&bytes)
                        ),
                    ));
                }
            }
            artifacts.push(LoadedArtifact {
                path: artifact.path.clone(),
                bytes,
            });
        }

        self.negotiate(&manifest, &entries)?;

        Ok(Arc::new(ModuleHandle::new(manifest, artifacts, entries)))
    }

    /// Join or declare every shared requirement of `manifest`
    ///
    /// All requirements are checked before the first declaration, so a
    /// conflict on one key leaves the fragment's other copies out of the
    /// scope.
    fn negotiate(
        &self,
        manifest: &FragmentManifest,
        entries: &BTreeMap<String, Arc<dyn FragmentEntry>>,
    ) -> Result<()> {
        let mut plan = Vec::new();
        let mut bundled: HashMap<String, Version> = HashMap::new();
        for (key, range) in manifest.requirements()? {
            if self.scope.satisfies(&key, &range)? {
                plan.push((key, range, None));
                continue;
            }
            if let Some(version) = bundled.get(&key) {
                if !range.matches(version) {
                    return Err(error::shared_dependency_conflict(
                        key,
                        range.to_string(),
                        version.to_string(),
                    ));
                }
                plan.push((key, range, None));
                continue;
            }

            let provision = entries
                .values()
                .find_map(|entry| entry.provision(&key))
                .ok_or_else(|| error::dependency_not_declared(&key))?;
            if !range.matches(provision.version()) {
                return Err(error::shared_dependency_conflict(
                    key,
                    range.to_string(),
                    provision.version().to_string(),
                ));
            }
            bundled.insert(key.clone(), provision.version().clone());
            plan.push((key, range, Some(provision)));
        }

        for (key, range, provision) in plan {
            match provision {
                Some(provision) => self.scope.declare(&key, &range, provision)?,
                None => self.scope.require(&key, &range)?,
            };
        }
        Ok(())
    }
}
