use futures::stream::{self, StreamExt};
use ps_core::{Error, Result};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;
use crate::fetcher::PageFetcher;

/// URL of page `page` (1-based) of a category listing.
pub fn listing_page_url(base_url: &str, page: u32) -> String {
    format!("{}/page/{}/", base_url.trim_end_matches('/'), page)
}

/// Walks the paginated listing of a category and collects article links.
pub struct LinkDiscoverer {
    fetcher: Arc<dyn PageFetcher>,
    listing: Selector,
    page_concurrency: usize,
}

impl LinkDiscoverer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, listing_selector: &str, page_concurrency: usize) -> Result<Self> {
        let listing = Selector::parse(listing_selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", listing_selector, e)))?;
        Ok(Self {
            fetcher,
            listing,
            page_concurrency: page_concurrency.max(1),
        })
    }

    /// Links found on pages `1..=pages` whose href contains `keyword`.
    ///
    /// A page that cannot be fetched is logged and skipped; links from the
    /// other pages are still returned.
    pub async fn discover(&self, base_url: &str, keyword: &str, pages: u32) -> HashSet<String> {
        let per_page: Vec<Vec<String>> = stream::iter(1..=pages.max(1))
            .map(|page| {
                let page_url = listing_page_url(base_url, page);
                async move {
                    match self.fetcher.fetch(&page_url).await {
                        Ok(html) => self.extract_links(&html, keyword, &page_url),
                        Err(e) => {
                            error!(url = %page_url, error = %e, "Error making request to listing page");
                            Vec::new()
                        }
                    }
                }
            })
            .buffer_unordered(self.page_concurrency)
            .collect()
            .await;

        let links: HashSet<String> = per_page.into_iter().flatten().collect();
        info!(url = base_url, keyword, count = links.len(), "Discovered article links");
        links
    }

    /// Keyword matching runs on the raw href and again on the resolved
    /// link, so every link returned contains `keyword`.
    pub fn extract_links(&self, html: &str, keyword: &str, page_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        document
            .select(&self.listing)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| href.contains(keyword))
            .filter_map(|href| match resolve_link(href, base.as_ref()) {
                Ok(link) if link.contains(keyword) => Some(link),
                Ok(link) => {
                    warn!(href, %link, keyword, "Skipping link that no longer matches once resolved");
                    None
                }
                Err(e) => {
                    warn!(page = page_url, error = %e, "Skipping unresolvable link");
                    None
                }
            })
            .collect()
    }
}

/// Absolute hrefs are kept as written; relative ones are joined onto `base`.
pub fn resolve_link(href: &str, base: Option<&Url>) -> Result<String> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    base.and_then(|b| b.join(href).ok())
        .map(|url| url.to_string())
        .ok_or_else(|| Error::InvalidUrl(href.to_string()))
}
