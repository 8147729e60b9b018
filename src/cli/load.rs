use clap::Parser;

/// Arguments for load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Fragment name as registered in the configuration
    pub name: String,

    /// Print the loaded fragment as JSON
    #[arg(long)]
    pub json: bool,
}
