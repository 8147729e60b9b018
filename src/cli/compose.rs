use clap::Parser;

/// Arguments for compose command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show every configured region:\n    fragment-host compose\n\n\
                  Show only the cart:\n    fragment-host compose --region cart\n\n\
                  Add product 1 to the cart before printing:\n    fragment-host compose --click products:add-1")]
pub struct ComposeArgs {
    /// Region to show (repeatable; defaults to every region)
    #[arg(long = "region", short = 'r', value_name = "NAME")]
    pub regions: Vec<String>,

    /// Press a button as REGION:KEY after the regions are shown (repeatable)
    #[arg(long = "click", value_name = "REGION:KEY", value_parser = parse_click)]
    pub clicks: Vec<Click>,

    /// Print regions without the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// A button press requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub region: String,
    pub key: String,
}

fn parse_click(value: &str) -> Result<Click, String> {
    match value.split_once(':') {
        Some((region, key)) if !region.is_empty() && !key.is_empty() => Ok(Click {
            region: region.to_string(),
            key: key.to_string(),
        }),
        _ => Err(format!("expected REGION:KEY, got '{value}'")),
    }
}
