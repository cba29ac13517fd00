use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "hintdesk", about = "Token-authenticated hint service")]
pub struct Cli {
    /// Settings file; defaults to settings/dev.toml or settings/release.toml.
    #[arg(long)]
    pub settings: Option<String>,
}
