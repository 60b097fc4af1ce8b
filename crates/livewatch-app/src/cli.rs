use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Livewatch: watches tracked broadcasters and announces when they go live.
#[derive(Parser, Debug)]
#[command(name = "livewatch", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (a tracing filter such as `debug` or `livewatch=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the monitor until interrupted (the default).
    Run,
    /// Run a single poll tick and wait for its notifications.
    Check,
    /// Ask the provider about handles without touching any state.
    Probe {
        #[arg(required = true)]
        handles: Vec<String>,
    },
    /// Track a broadcaster for an owner, replacing any previous link.
    Link {
        handle: String,
        #[arg(long)]
        owner: String,
        /// Display name of the owner.
        #[arg(long)]
        name: String,
        #[arg(long)]
        group: String,
    },
    /// Stop tracking an owner's broadcaster.
    Unlink {
        #[arg(long)]
        owner: String,
    },
    /// Make a destination the only notification channel of a group.
    SetChannel {
        #[arg(long)]
        group: String,
        #[arg(long)]
        destination: String,
    },
    /// List the group's tracked broadcasters that are live right now.
    Live {
        #[arg(long)]
        group: String,
    },
    /// Inspect the configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective config as JSON, secrets redacted.
    Show,
    /// Print the config file location.
    Path,
}

pub fn parse() -> Args {
    Args::parse()
}
