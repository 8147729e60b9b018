//! Fragment registry and loader
//!
//! A fragment is described statically by a [`FragmentDescriptor`] and loaded
//! lazily: the manifest is fetched from the fragment's origin, its exposed
//! modules are bound to statically linked entries, artifacts are fetched and
//! verified, and shared dependencies are negotiated with the scope. The
//! [`FragmentRegistry`] caches one [`LoadedFragment`] per name and coalesces
//! concurrent loads.

pub mod descriptor;
pub mod fetcher;
pub mod linker;
pub mod manifest;
pub mod registry;

pub use descriptor::FragmentDescriptor;
pub use fetcher::{FetchError, HttpFetcher, RemoteFetcher};
pub use linker::{FragmentEntry, ModuleLinker};
pub use manifest::{ArtifactRef, FragmentManifest, SharedRequirement};
pub use registry::FragmentRegistry;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{self, ErrorInfo, Result};

/// Load lifecycle of a cached fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A fetched artifact, kept as opaque bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedArtifact {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Loaded code of a fragment: its manifest bound to linked entries
pub struct ModuleHandle {
    manifest: FragmentManifest,
    artifacts: Vec<LoadedArtifact>,
    entries: BTreeMap<String, Arc<dyn FragmentEntry>>,
}

impl ModuleHandle {
    pub(crate) fn new(
        manifest: FragmentManifest,
        artifacts: Vec<LoadedArtifact>,
        entries: BTreeMap<String, Arc<dyn FragmentEntry>>,
    ) -> Self {
        Self {
            manifest,
            artifacts,
            entries,
        }
    }

    pub fn manifest(&self) -> &FragmentManifest {
        &self.manifest
    }

    /// Entry of an exposed module
    pub fn entry(&self, module: &str) -> Option<Arc<dyn FragmentEntry>> {
        self.entries.get(module).cloned()
    }

    pub fn exposed(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn artifacts(&self) -> &[LoadedArtifact] {
        &self.artifacts
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.manifest.name)
            .field("exposed", &self.exposed())
            .field("artifacts", &self.artifacts.len())
            .finish()
    }
}

/// Cached state of one registered fragment
#[derive(Debug, Clone)]
pub struct LoadedFragment {
    pub descriptor: FragmentDescriptor,
    pub module: Option<Arc<ModuleHandle>>,
    pub load_state: LoadState,
    pub error: Option<ErrorInfo>,
    /// Load attempts started for this slot
    pub attempts: u32,
}

impl LoadedFragment {
    pub(crate) fn unloaded(descriptor: FragmentDescriptor) -> Self {
        Self {
            descriptor,
            module: None,
            load_state: LoadState::Unloaded,
            error: None,
            attempts: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// The module handle, or the recorded failure as an error
    pub fn ready_module(&self) -> Result<Arc<ModuleHandle>> {
        match (&self.module, self.load_state) {
            (Some(module), LoadState::Ready) => Ok(Arc::clone(module)),
            _ => Err(self
                .error
                .clone()
                .map(|info| info.into_error(self.name()))
                .unwrap_or_else(|| {
                    error::fragment_load_failed(
                        self.name(),
                        error::LoadFailureKind::Network,
                        format!("fragment is {}", self.load_state),
                    )
                })),
        }
    }
}
