use clap::Parser;
use ps_core::{HarvestConfig, Result};
use ps_core::ArticleStore;
use ps_scrapers::cli::{handle_command, HumanDuration, ScraperArgs, ScraperCommands};
use ps_scrapers::HarvestRunner;
use ps_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvest popsci articles by category and serve them", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "PS_STORAGE", default_value = "sqlite")]
    storage: String,
    /// Database location (a file path for sqlite)
    #[arg(long, env = "PS_DATABASE", default_value = "articles.db")]
    database: String,
    /// TOML file overriding the default harvest configuration
    #[arg(long, env = "PS_CONFIG")]
    config: Option<PathBuf>,
    /// Log file, overwritten on every start
    #[arg(long, env = "PS_LOG_FILE", default_value = "app.log")]
    log_file: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Clear every category and harvest it again
    Scrape {
        /// Repeat the run with this interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the read API
    Serve {
        #[arg(long, default_value = "0.0.0.0:5000")]
        addr: SocketAddr,
        /// Also harvest in the background with this interval (e.g. 6h)
        #[arg(long)]
        harvest_every: Option<HumanDuration>,
    },
    /// Scrape a single article and print the extracted fields
    Article { url: String },
    /// List configured categories
    Categories,
}

impl Commands {
    /// The scraper command this maps onto, if any.
    fn scraper_command(&self) -> Option<ScraperCommands> {
        match self {
            Commands::Scrape { interval } => Some(ScraperCommands::Run { interval: *interval }),
            Commands::Article { url } => Some(ScraperCommands::Article { url: url.clone() }),
            Commands::Categories => Some(ScraperCommands::Categories),
            Commands::Serve { .. } => None,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HarvestConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading harvest configuration");
            HarvestConfig::from_file(path)
        }
        None => Ok(HarvestConfig::default()),
    }
}

/// Flips the returned receiver to `true` on Ctrl-C.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = tx.send(true);
            }
            Err(e) => error!(error = %e, "Unable to listen for shutdown signal"),
        }
        // Keep the sender alive so receivers don't see a closed channel.
        std::future::pending::<()>().await;
    });
    rx
}

/// Serves the read API until shutdown. A background harvest, when given, is
/// awaited afterwards so it stops at a category boundary.
async fn serve(
    addr: SocketAddr,
    storage: Arc<dyn ArticleStore>,
    harvest: Option<(HarvestRunner, Duration)>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let background = harvest.map(|(runner, interval)| {
        let rx = shutdown.clone();
        tokio::spawn(async move { runner.run_every(interval, rx).await })
    });

    let mut rx = shutdown;
    let stop = async move {
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    };
    let served = ps_web::serve(addr, AppState::new(storage), stop).await;

    if let Some(handle) = background {
        info!("Waiting for the background harvest to stop");
        if let Err(e) = handle.await {
            error!(error = %e, "Background harvest task failed");
        }
    }
    served
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(&cli.log_file)?;

    let config = load_config(cli.config.as_ref())?;
    let storage = ps_storage::create_storage(&cli.storage, Some(&cli.database)).await?;
    info!("💾 Storage initialized (using {})", cli.storage);
    let shutdown = shutdown_signal();

    match cli.command.scraper_command() {
        Some(command) => {
            let runner = ps_scrapers::build_runner(&config, storage)?;
            handle_command(ScraperArgs { command }, &runner, shutdown).await?;
        }
        None => {
            let Commands::Serve { addr, harvest_every } = cli.command else {
                return Ok(());
            };
            let harvest = match harvest_every {
                Some(interval) => Some((ps_scrapers::build_runner(&config, storage.clone())?, interval.0)),
                None => None,
            };
            serve(addr, storage, harvest, shutdown).await?;
        }
    }

    Ok(())
}
