//! livewatch: polls tracked broadcasters and announces them going live.

mod cli;
mod commands;
mod wiring;

use std::process::ExitCode;

use livewatch_common::LivewatchError;
use livewatch_config::LivewatchConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command, ConfigCommand};

const DEFAULT_DIRECTIVE: &str = "livewatch=info";

/// Load environment variables from a .env file (KEY=VALUE lines).
///
/// Variables already set in the process environment win.
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Current directory
        std::path::PathBuf::from(".env"),
        // Workspace root, two levels up from crates/livewatch-app/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
            return;
        }
    }
}

fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key, value)
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// `--log-level` wins, then `RUST_LOG`, then the config file's level.
fn log_filter(flag: Option<&str>, config: Option<&LivewatchConfig>) -> EnvFilter {
    if let Some(directive) = flag {
        return EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = config.map_or(DEFAULT_DIRECTIVE, |c| c.logging.level.directive());
    EnvFilter::new(directive)
}

async fn dispatch(
    command: Command,
    config: &LivewatchConfig,
    args: &Args,
) -> Result<(), LivewatchError> {
    match command {
        Command::Run => commands::run(config).await,
        Command::Check => commands::check(config).await,
        Command::Probe { handles } => commands::probe(config, &handles).await,
        Command::Link {
            handle,
            owner,
            name,
            group,
        } => commands::link(config, &handle, &owner, &name, &group).await,
        Command::Unlink { owner } => commands::unlink(config, &owner).await,
        Command::SetChannel { group, destination } => {
            commands::set_channel(config, &group, &destination).await
        }
        Command::Live { group } => commands::live(config, &group).await,
        Command::Config(ConfigCommand::Show) => {
            commands::config_show(config);
            Ok(())
        }
        Command::Config(ConfigCommand::Path) => commands::config_path(args.config.as_deref()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file before anything else
    load_dotenv();

    let mut args = cli::parse();
    let command = args.command.take().unwrap_or(Command::Run);

    // `config path` works even when the file is unreadable.
    if command == Command::Config(ConfigCommand::Path) {
        return match commands::config_path(args.config.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = livewatch_config::load_config(args.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.log_level.as_deref(), config.as_ref().ok()))
        .init();

    tracing::info!("livewatch v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(command, &config, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
