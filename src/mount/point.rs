//! Per-region mount state machine
//!
//! ```text
//! Empty -> Loading -> Mounted
//!                  -> LoadFailed
//! any   -> Empty      (host teardown)
//! ```
//!
//! A point is activated only from `Empty`. Teardown while `Loading` makes
//! the pending activation stale: its result is discarded when the load
//! completes, and the load itself still populates the registry cache.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error};

use super::{Container, Mountable, Node};
use crate::context::HostContext;
use crate::error::{self, ErrorInfo, ErrorKind, HostError, Result};
use crate::fragment::FragmentRegistry;

/// Lifecycle of one mount point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountState {
    Empty,
    Loading,
    Mounted,
    LoadFailed(ErrorInfo),
}

impl fmt::Display for MountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountState::Empty => f.write_str("empty"),
            MountState::Loading => f.write_str("loading"),
            MountState::Mounted => f.write_str("mounted"),
            MountState::LoadFailed(_) => f.write_str("load failed"),
        }
    }
}

/// How an activation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    /// The region shows its fallback
    Fallback(ErrorInfo),
    /// The region was torn down before the load finished
    Discarded,
}

struct PointState {
    state: MountState,
    /// Bumped on every activation and teardown
    attempt: u64,
    instance: Option<Box<dyn Mountable>>,
}

/// A host region bound to one exposed module of one fragment
pub struct MountPoint {
    region: String,
    fragment: String,
    module: String,
    fallback: String,
    container: Container,
    state: Mutex<PointState>,
}

impl MountPoint {
    pub fn new(
        region: impl Into<String>,
        fragment: impl Into<String>,
        module: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        let region = region.into();
        Self {
            container: Container::new(&region),
            region,
            fragment: fragment.into(),
            module: module.into(),
            fallback: fallback.into(),
            state: Mutex::new(PointState {
                state: MountState::Empty,
                attempt: 0,
                instance: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PointState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn state(&self) -> MountState {
        self.lock().state.clone()
    }

    /// Load the fragment and mount it into this region
    ///
    /// Load and mount failures degrade the region to its fallback and are
    /// returned as [`MountOutcome::Fallback`]. Unknown fragments and
    /// undeclared shared dependencies are misconfigurations: the fallback is
    /// rendered and the error is returned.
    pub async fn activate(
        &self,
        registry: &FragmentRegistry,
        ctx: &HostContext,
    ) -> Result<MountOutcome> {
        let attempt = {
            let mut point = self.lock();
            if point.state != MountState::Empty {
                return Err(error::invalid_mount_transition(
                    &self.region,
                    point.state.to_string(),
                ));
            }
            point.state = MountState::Loading;
            point.attempt += 1;
            point.attempt
        };
        debug!(region = %self.region, fragment = %self.fragment, "empty -> loading");

        let module = match registry.load(&self.fragment).await {
            Ok(loaded) => loaded.ready_module(),
            Err(err) => Err(err),
        };

        let mut point = self.lock();
        if point.attempt != attempt {
            debug!(region = %self.region, "discarding load result of retired region");
            return Ok(MountOutcome::Discarded);
        }

        let mounted = module.and_then(|module| {
            let entry = module.entry(&self.module).ok_or_else(|| {
                error::mount_failed(
                    &self.region,
                    format!(
                        "fragment '{}' does not expose '{}'",
                        self.fragment, self.module
                    ),
                )
            })?;
            let instance = entry.instantiate(ctx)?;
            instance.mount(&self.container)?;
            Ok(instance)
        });

        match mounted {
            Ok(instance) => {
                point.state = MountState::Mounted;
                point.instance = Some(instance);
                debug!(region = %self.region, "loading -> mounted");
                Ok(MountOutcome::Mounted)
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                point.state = MountState::LoadFailed(info.clone());
                drop(point);
                self.render_fallback(&err);

                if is_misconfiguration(info.kind) {
                    Err(err)
                } else {
                    Ok(MountOutcome::Fallback(info))
                }
            }
        }
    }

    fn render_fallback(&self, err: &HostError) {
        error!(
            region = %self.region,
            fragment = %self.fragment,
            error = %err,
            "region degraded to fallback"
        );
        // Drops whatever a failed mount left behind.
        self.container.clear();
        self.container
            .replace(vec![Node::text("fallback", &self.fallback)]);
    }

    /// Host-driven teardown: clear the container and return to `Empty`
    ///
    /// Returns the state the point was in.
    pub fn teardown(&self) -> MountState {
        let (previous, instance) = {
            let mut point = self.lock();
            point.attempt += 1;
            let previous = std::mem::replace(&mut point.state, MountState::Empty);
            (previous, point.instance.take())
        };
        self.container.clear();
        drop(instance);
        debug!(region = %self.region, from = %previous, "-> empty");
        previous
    }
}

impl fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountPoint")
            .field("region", &self.region)
            .field("fragment", &self.fragment)
            .field("module", &self.module)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn is_misconfiguration(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnknownFragment | ErrorKind::DependencyNotDeclared
    )
}
