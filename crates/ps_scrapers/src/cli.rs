use clap::{Args, Subcommand};
use ps_core::{Error, Result};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use crate::extractor::Extraction;
use crate::runner::HarvestRunner;

/// A duration written as `1h`, `30m`, `1d` or `1h 15m 30s`. Zero is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let duration = humantime::parse_duration(s).map_err(|e| format!("Invalid duration {:?}: {}", s, e))?;
        if duration.is_zero() {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(duration))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Clear every category and harvest it again
    Run {
        /// Repeat the run with this interval (e.g. 1h, 30m, 1d, 1h 15m)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Scrape a single article and print the extracted fields
    Article {
        url: String,
    },
    /// List configured categories
    Categories,
}

pub async fn handle_command(
    args: ScraperArgs,
    runner: &HarvestRunner,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    match args.command {
        ScraperCommands::Run { interval: Some(interval) } => {
            info!("Running in periodic mode with {}s interval", interval.0.as_secs());
            runner.run_every(interval.0, shutdown).await;
        }
        ScraperCommands::Run { interval: None } => {
            let report = runner.run_until(shutdown).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ScraperCommands::Article { url } => {
            match runner.harvester().articles().try_scrape(&url).await? {
                Extraction::Article(article) => {
                    println!("{}", serde_json::to_string_pretty(&article)?);
                    if !article.is_complete() {
                        let missing: Vec<String> = article.missing_fields().iter().map(|f| f.to_string()).collect();
                        println!("Incomplete, would not be stored (missing: {})", missing.join(", "));
                    }
                }
                Extraction::Stale { datetime } => {
                    return Err(Error::Scraping(format!(
                        "Article published {} is outside the recency window",
                        datetime
                    )));
                }
            }
        }
        ScraperCommands::Categories => {
            println!("Configured categories:");
            for category in runner.categories() {
                println!(
                    "  {} ({} pages, keyword \"{}\") -> {}",
                    category.url,
                    category.pages,
                    category.keyword,
                    category.collection()
                );
            }
        }
    }
    Ok(())
}
