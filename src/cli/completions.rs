use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    fragment-host completions bash > ~/.bash_completion.d/fragment-host\n\n\
                  Generate zsh completions:\n    fragment-host completions zsh > ~/.zfunc/_fragment-host\n\n\
                  Generate fish completions:\n    fragment-host completions fish > ~/.config/fish/completions/fragment-host.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
