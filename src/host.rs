//! The host shell: regions, fragments and the wiring between them
//!
//! Built once from the configuration. Every region starts `Empty`; showing
//! a region is the lazy trigger that loads its fragment. The cart bridge is
//! connected for the host's lifetime.

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::info;

use crate::cart::CartBridge;
use crate::config::HostConfig;
use crate::context::HostContext;
use crate::error::{self, Result};
use crate::fragment::{FragmentRegistry, HttpFetcher, ModuleLinker, RemoteFetcher};
use crate::fragments::builtin_linker;
use crate::mount::{MountOutcome, MountPoint, MountState};

/// Outcome of showing one region
#[derive(Debug)]
pub struct RegionReport {
    pub region: String,
    pub outcome: Result<MountOutcome>,
}

pub struct Host {
    ctx: HostContext,
    registry: FragmentRegistry,
    regions: Vec<MountPoint>,
    bridge: CartBridge,
}

impl Host {
    /// Host with the built-in fragments, fetching over HTTP or from disk
    pub fn builtin(config: &HostConfig) -> Result<Self> {
        let linker = builtin_linker(config.catalog.source());
        Self::from_config(config, linker, Arc::new(HttpFetcher::new()))
    }

    pub fn from_config(
        config: &HostConfig,
        linker: ModuleLinker,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Result<Self> {
        config.validate()?;
        let ctx = HostContext::new(config.notification.timeout())?;
        let registry = FragmentRegistry::new(fetcher, linker, Arc::clone(ctx.scope()));
        for descriptor in config.descriptors()? {
            registry.register(descriptor)?;
        }

        let regions = config
            .regions
            .iter()
            .map(|r| MountPoint::new(&r.name, &r.fragment, &r.module, &r.fallback))
            .collect();

        let bridge = CartBridge::connect(
            ctx.bus(),
            Arc::clone(ctx.cart()),
            ctx.notifications().clone(),
        );

        info!(
            fragments = registry.names().len(),
            regions = config.regions.len(),
            "host ready"
        );
        Ok(Self {
            ctx,
            registry,
            regions,
            bridge,
        })
    }

    pub fn context(&self) -> &HostContext {
        &self.ctx
    }

    pub fn registry(&self) -> &FragmentRegistry {
        &self.registry
    }

    /// Regions in configuration order
    pub fn regions(&self) -> &[MountPoint] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Result<&MountPoint> {
        self.regions
            .iter()
            .find(|point| point.region() == name)
            .ok_or_else(|| error::unknown_region(name))
    }

    /// Load and mount the fragment of one region
    pub async fn show_region(&self, name: &str) -> Result<MountOutcome> {
        let point = self.region(name)?;
        point.activate(&self.registry, &self.ctx).await
    }

    /// Show every region concurrently
    pub async fn show_all(&self) -> Vec<RegionReport> {
        let shows = self.regions.iter().map(|point| async move {
            RegionReport {
                region: point.region().to_string(),
                outcome: point.activate(&self.registry, &self.ctx).await,
            }
        });
        join_all(shows).await
    }

    /// Wait for the asynchronous startup of every mounted fragment
    pub async fn settle(&self) {
        join_all(self.regions.iter().map(|point| point.container().settle())).await;
    }

    /// Host-driven teardown of one region
    pub fn retire_region(&self, name: &str) -> Result<MountState> {
        Ok(self.region(name)?.teardown())
    }

    /// Press a button rendered in a region
    pub fn click(&self, region: &str, key: &str) -> Result<bool> {
        Ok(self.region(region)?.container().click(key))
    }

    /// Retire every region and disconnect the cart bridge
    pub fn shutdown(&self) {
        for point in &self.regions {
            point.teardown();
        }
        self.bridge.detach();
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("registry", &self.registry)
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}
