use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quedabot")]
#[command(author, version, about = "Telegram front end for the Quedada event platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling). This is the default.
    Run,

    /// Check the backend: list the published events and exit
    Ping,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
