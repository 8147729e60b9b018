//! Load command implementation

use std::path::PathBuf;

use serde::Serialize;

use fragment_host::error::{ErrorInfo, HostError, Result};
use fragment_host::fragment::{LoadState, LoadedFragment};
use fragment_host::host::Host;

use crate::cli::LoadArgs;
use crate::ui::display;

#[derive(Debug, Serialize)]
struct FragmentReport<'a> {
    name: &'a str,
    remote_origin: String,
    load_state: LoadState,
    attempts: u32,
    framework: Option<&'a str>,
    exposes: Vec<&'a str>,
    artifacts: Vec<&'a str>,
    error: Option<&'a ErrorInfo>,
}

impl<'a> FragmentReport<'a> {
    fn of(fragment: &'a LoadedFragment) -> Self {
        let module = fragment.module.as_deref();
        Self {
            name: fragment.name(),
            remote_origin: fragment.descriptor.remote_origin.to_string(),
            load_state: fragment.load_state,
            attempts: fragment.attempts,
            framework: module.and_then(|m| m.manifest().framework.as_deref()),
            exposes: module.map(|m| m.exposed()).unwrap_or_default(),
            artifacts: module
                .map(|m| m.artifacts().iter().map(|a| a.path.as_str()).collect())
                .unwrap_or_default(),
            error: fragment.error.as_ref(),
        }
    }
}

/// Run load command
///
/// Fails when the fragment does not reach `Ready`.
pub async fn run(config: Option<PathBuf>, args: LoadArgs) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let host = Host::builtin(&config)?;
    let fragment = host.registry().load(&args.name).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&FragmentReport::of(&fragment)).map_err(|e| {
            HostError::IoError {
                message: e.to_string(),
            }
        })?;
        println!("{json}");
    } else {
        display::display_fragment(&fragment);
    }

    fragment.ready_module().map(|_| ())
}
