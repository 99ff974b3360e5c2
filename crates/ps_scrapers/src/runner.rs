use ps_core::Category;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use crate::harvester::{CategoryHarvester, HarvestReport};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub cleared: usize,
    pub clear_failures: usize,
    pub categories: Vec<HarvestReport>,
    /// Set when a shutdown request stopped the run between categories
    pub cancelled: bool,
}

impl RunReport {
    pub fn stored(&self) -> usize {
        self.categories.iter().map(|c| c.stored).sum()
    }
}

/// Drives a harvester over the configured categories.
///
/// Every category's collection is cleared before the first harvest starts,
/// so an interrupted run leaves the remaining categories empty until the
/// next complete run.
pub struct HarvestRunner {
    harvester: CategoryHarvester,
    categories: Vec<Category>,
}

impl HarvestRunner {
    pub fn new(harvester: CategoryHarvester, categories: Vec<Category>) -> Self {
        Self { harvester, categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn harvester(&self) -> &CategoryHarvester {
        &self.harvester
    }

    pub async fn run(&self) -> RunReport {
        let (_tx, rx) = watch::channel(false);
        self.run_until(rx).await
    }

    /// One run; `shutdown` is checked between categories.
    pub async fn run_until(&self, shutdown: watch::Receiver<bool>) -> RunReport {
        info!(
            categories = self.categories.len(),
            "Starting harvest run; categories stay empty until their harvest completes"
        );
        let mut report = RunReport::default();
        if *shutdown.borrow() {
            warn!("Shutdown requested before the run started, leaving collections untouched");
            report.cancelled = true;
            return report;
        }

        for category in &self.categories {
            let collection = category.collection();
            match self.harvester.store().clear(&collection).await {
                Ok(()) => report.cleared += 1,
                Err(e) => {
                    error!(%collection, error = %e, "Error clearing collection");
                    report.clear_failures += 1;
                }
            }
        }

        for category in &self.categories {
            if *shutdown.borrow() {
                warn!(category = %category.name, "Shutdown requested, stopping harvest run");
                report.cancelled = true;
                break;
            }
            report.categories.push(self.harvester.harvest(category).await);
        }

        info!(stored = report.stored(), cancelled = report.cancelled, "Harvest run finished");
        report
    }

    /// Repeats runs every `interval` until `shutdown` flips or its sender goes away.
    pub async fn run_every(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            let report = self.run_until(shutdown.clone()).await;
            if report.cancelled || *shutdown.borrow() {
                break;
            }
            info!("Waiting {}s before next harvest run", interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
