use clap::{Parser, Subcommand};

/// Beacon — broadcasts your editor activity as rich presence.
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the broadcaster, reading editor events from stdin (default).
    Run,
    /// Turn broadcasting on in the config file.
    Enable,
    /// Turn broadcasting off in the config file.
    Disable,
    /// List the running instances sharing this profile.
    Instances,
    /// Select which instance broadcasts (see `instances` for ids).
    SetActive {
        /// Instance id to make active.
        id: String,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
