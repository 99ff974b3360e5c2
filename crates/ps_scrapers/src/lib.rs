pub mod article;
pub mod cli;
pub mod extractor;
pub mod fetcher;
pub mod harvester;
pub mod links;
pub mod runner;
pub mod sites;

use ps_core::{ArticleStore, HarvestConfig, Result};
use std::sync::Arc;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use harvester::{CategoryHarvester, HarvestReport};
pub use runner::{HarvestRunner, RunReport};

/// Runner over the configured categories using a real HTTP client.
pub fn build_runner(config: &HarvestConfig, store: Arc<dyn ArticleStore>) -> Result<HarvestRunner> {
    config.validate()?;
    let fetcher = Arc::new(HttpFetcher::from_config(config)?);
    let harvester = CategoryHarvester::from_config(fetcher, store, config)?;
    Ok(HarvestRunner::new(harvester, config.categories.clone()))
}
