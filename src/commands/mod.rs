//! Command implementations for the fragment host CLI

pub mod completions;
pub mod compose;
pub mod load;
pub mod version;

use std::path::{Path, PathBuf};

use fragment_host::config::{HostConfig, resolve_config_path};
use fragment_host::error::Result;

/// Find and load the host configuration
fn load_config(explicit: Option<&Path>) -> Result<HostConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path = resolve_config_path(explicit, &cwd);
    tracing::debug!(path = %path.display(), "loading host configuration");
    HostConfig::load(&path)
}
