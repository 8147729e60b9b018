//! Version command implementation

use fragment_host::context::SHARED_RUNTIME_VERSION;
use fragment_host::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("fragment-host {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    println!("  Shared runtime: {SHARED_RUNTIME_VERSION}");

    Ok(())
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
