//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - compose: Compose command arguments
//! - load: Load command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use fragment_host::logging::LogFormat;

pub mod completions;
pub mod compose;
pub mod load;

pub use completions::CompletionsArgs;
pub use compose::{Click, ComposeArgs};
pub use load::LoadArgs;

/// Fragment host - compose independently deployed UI fragments
#[derive(Parser, Debug)]
#[command(
    name = "fragment-host",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Compose remote UI fragments into one application",
    long_about = "Loads the fragments declared in a host configuration, negotiates their shared \
                  dependencies and mounts each one into its region. A fragment that cannot be \
                  loaded degrades to its region's fallback without affecting the others.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  fragment-host compose                       \x1b[90m# Show every region\x1b[0m\n   \
                  fragment-host compose --region cart         \x1b[90m# Show one region\x1b[0m\n   \
                  fragment-host compose --click products:add-1 \x1b[90m# Press a button, then show\x1b[0m\n   \
                  fragment-host load catalog                  \x1b[90m# Load one fragment\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Host configuration file
    #[arg(long, short = 'c', global = true, env = "FRAGMENT_HOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and mount regions, then print what they render
    Compose(ComposeArgs),

    /// Load a single fragment and report its state
    Load(LoadArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
