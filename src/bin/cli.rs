//! feedrelay CLI
//!
//! Local execution entry point, meant to be run from cron.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use feedrelay::{
    error::{AppError, Result},
    models::Config,
    pipeline::{Relay, RelayOptions},
    services::{RssFetcher, TelegramClient},
    storage::SeenStore,
};

/// feedrelay - RSS to Telegram relay
#[derive(Parser, Debug)]
#[command(name = "feedrelay", version, about = "Posts new RSS entries to a Telegram chat")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch feeds and deliver new entries
    Run {
        /// Only process the feed with this name
        #[arg(long)]
        feed: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show delivered entry counts per feed
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load(&cli.config);

    let debug = cli.verbose
        || config
            .as_ref()
            .is_ok_and(|config| config.telegram.send_debug);
    init_logging(debug);

    log::info!("Config file: {}", cli.config.display());

    match execute(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command, config: Result<Config>) -> Result<ExitCode> {
    let config = config?;

    match command {
        Command::Run { feed } => {
            config.validate()?;

            let feeds = match feed {
                Some(name) => {
                    let source = config
                        .feed(&name)
                        .ok_or_else(|| AppError::config(format!("No feed named '{}'", name)))?;
                    vec![source.clone()]
                }
                None => config.feeds.clone(),
            };

            let store = SeenStore::open(&config.db_path)?;
            let fetcher = RssFetcher::new(&config.fetch)?;
            let messenger = TelegramClient::new(&config.telegram)?;
            let relay = Relay::new(
                &store,
                &fetcher,
                &messenger,
                RelayOptions::from_config(&config),
            );

            let summary = relay.run_all(&feeds).await?;
            if !summary.failed.is_empty() {
                log::error!("Failed feeds: {}", summary.failed.join(", "));
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK ({} feeds)", config.feeds.len());
        }

        Command::Info => {
            let store = SeenStore::open(&config.db_path)?;
            log::info!("Store: {}", store.path().display());

            let namespaces = store.namespaces()?;
            if namespaces.is_empty() {
                log::info!("No feeds recorded yet.");
            }
            for name in namespaces {
                log::info!("    {}: {} delivered", name, store.count(&name)?);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
