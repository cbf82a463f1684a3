use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "ika", about = "Messaging backend with token-based sessions")]
pub struct Cli {
    /// Path to the settings file
    #[arg(long)]
    pub settings: Option<String>,
}
