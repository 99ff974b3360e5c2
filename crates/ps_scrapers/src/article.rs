use ps_core::{Result, ScrapedArticle};
use std::sync::Arc;
use tracing::{debug, error};
use crate::extractor::{Extraction, FieldExtractor};
use crate::fetcher::PageFetcher;

#[derive(Debug)]
pub enum ArticleOutcome {
    Scraped(ScrapedArticle),
    /// Dropped by the recency filter
    Stale,
    /// Fetch failed; already logged
    Failed,
}

/// Fetches one article page and runs the field extractor over it.
#[derive(Clone)]
pub struct ArticleFetcher {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<FieldExtractor>,
}

impl ArticleFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: Arc<FieldExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Like [`scrape_article`](Self::scrape_article) but hands the fetch
    /// error back instead of logging it.
    pub async fn try_scrape(&self, url: &str) -> Result<Extraction> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.extractor.extract_html(url, &html))
    }

    pub async fn scrape_article(&self, url: &str) -> ArticleOutcome {
        match self.try_scrape(url).await {
            Ok(Extraction::Article(article)) => ArticleOutcome::Scraped(article),
            Ok(Extraction::Stale { datetime }) => {
                debug!(%url, %datetime, "Skipping article outside the recency window");
                ArticleOutcome::Stale
            }
            Err(e) => {
                error!(%url, error = %e, "Error making request to article");
                ArticleOutcome::Failed
            }
        }
    }
}
