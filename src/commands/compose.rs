//! Compose command implementation

use std::path::PathBuf;

use futures_util::future::join_all;
use tracing::warn;

use fragment_host::error::Result;
use fragment_host::host::Host;
use fragment_host::mount::MountPoint;

use crate::cli::ComposeArgs;
use crate::progress::ProgressDisplay;
use crate::ui::display;

/// Run compose command
///
/// Regions that degrade to their fallback do not fail the command;
/// misconfigured regions do, after everything else has been printed.
pub async fn run(config: Option<PathBuf>, args: ComposeArgs) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let host = Host::builtin(&config)?;

    let selected: Vec<&MountPoint> = if args.regions.is_empty() {
        host.regions().iter().collect()
    } else {
        args.regions
            .iter()
            .map(|name| host.region(name))
            .collect::<Result<_>>()?
    };

    let progress = (!args.quiet).then(|| ProgressDisplay::new(selected.len() as u64));
    let shows = selected.iter().map(|point| {
        let progress = progress.as_ref();
        let host = &host;
        async move {
            let outcome = host.show_region(point.region()).await;
            if let Some(progress) = progress {
                progress.region_done(point.region());
            }
            outcome
        }
    });
    let outcomes = join_all(shows).await;
    host.settle().await;
    if let Some(progress) = &progress {
        progress.finish();
    }

    for click in &args.clicks {
        if !host.click(&click.region, &click.key)? {
            display::warning(&format!(
                "no button '{}' in region '{}'",
                click.key, click.region
            ));
        }
    }

    for point in &selected {
        display::display_region(point);
    }
    display::display_notification(&host.context().notifications().current());

    host.shutdown();

    let mut first_error = None;
    for outcome in outcomes {
        if let Err(e) = outcome {
            warn!(error = %e, "region misconfigured");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
