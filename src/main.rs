//! fragment-host - compose remote UI fragments into one application
//!
//! Thin shell around the `fragment_host` library: reads the host
//! configuration, shows regions and prints what they render.

use clap::Parser;
use miette::Diagnostic;

use fragment_host::logging::{LogConfig, init_logging};

mod cli;
mod commands;
mod progress;
mod ui;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(console::colors_enabled_stderr());
    init_logging(&log_config);

    let result = match cli.command {
        Commands::Compose(args) => commands::compose::run(cli.config, args).await,
        Commands::Load(args) => commands::load::run(cli.config, args).await,
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(help) = e.help() {
            eprintln!("  help: {}", help);
        }
        std::process::exit(1);
    }
}
