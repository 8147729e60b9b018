//! Display functions for regions, fragments and notifications

use console::Style;

use fragment_host::fragment::{LoadState, LoadedFragment};
use fragment_host::mount::{MountPoint, MountState};
use fragment_host::notification::NotificationState;

fn state_style(state: &MountState) -> Style {
    match state {
        MountState::Mounted => Style::new().green(),
        MountState::LoadFailed(_) => Style::new().red(),
        MountState::Empty | MountState::Loading => Style::new().yellow(),
    }
}

/// Print a region's header followed by what it renders
pub fn display_region(point: &MountPoint) {
    let state = point.state();
    println!(
        "{} {} {}",
        Style::new().bold().cyan().apply_to(point.region()),
        Style::new()
            .dim()
            .apply_to(format!("({}/{})", point.fragment(), point.module())),
        state_style(&state).apply_to(format!("[{state}]"))
    );

    let rendered = point.container().render();
    if rendered.is_empty() {
        println!("  {}", Style::new().dim().apply_to("(empty)"));
    }
    for line in rendered.lines() {
        println!("  {line}");
    }
    println!();
}

pub fn display_notification(state: &NotificationState) {
    if state.visible {
        println!(
            "{} {}",
            Style::new().bold().yellow().apply_to("Notification:"),
            state.message
        );
    }
}

/// Print a fragment's load state and exposed modules
pub fn display_fragment(fragment: &LoadedFragment) {
    let state_style = match fragment.load_state {
        LoadState::Ready => Style::new().green(),
        LoadState::Failed => Style::new().red(),
        LoadState::Unloaded | LoadState::Loading => Style::new().yellow(),
    };

    println!("{}", Style::new().bold().cyan().apply_to(fragment.name()));
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Origin:"),
        fragment.descriptor.remote_origin
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("State:"),
        state_style.apply_to(fragment.load_state)
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Attempts:"),
        fragment.attempts
    );

    if let Some(module) = &fragment.module {
        let manifest = module.manifest();
        if let Some(framework) = &manifest.framework {
            println!("  {} {}", Style::new().bold().apply_to("Framework:"), framework);
        }
        println!("  {}", Style::new().bold().apply_to("Exposes:"));
        for name in module.exposed() {
            println!("    - {name}");
        }
        if !module.artifacts().is_empty() {
            println!("  {}", Style::new().bold().apply_to("Artifacts:"));
            for artifact in module.artifacts() {
                println!("    - {} ({} bytes)", artifact.path, artifact.bytes.len());
            }
        }
    }

    if let Some(error) = &fragment.error {
        println!(
            "  {} {}",
            Style::new().bold().red().apply_to("Error:"),
            error.message
        );
    }
}

pub fn warning(message: &str) {
    eprintln!("{} {message}", Style::new().bold().yellow().apply_to("Warning:"));
}
