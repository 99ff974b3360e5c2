use futures::stream::{self, StreamExt};
use ps_core::{ArticleStore, Category, HarvestConfig, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use crate::article::{ArticleFetcher, ArticleOutcome};
use crate::extractor::FieldExtractor;
use crate::fetcher::PageFetcher;
use crate::links::LinkDiscoverer;
use crate::sites::popsci;

/// Counters for one category harvest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub category: String,
    pub links: usize,
    pub fetch_failures: usize,
    pub stale: usize,
    pub incomplete: usize,
    pub stored: usize,
    pub insert_failures: usize,
}

enum LinkResult {
    Stored,
    InsertFailed,
    Incomplete,
    Stale,
    FetchFailed,
}

impl HarvestReport {
    fn record(&mut self, result: LinkResult) {
        match result {
            LinkResult::Stored => self.stored += 1,
            LinkResult::InsertFailed => self.insert_failures += 1,
            LinkResult::Incomplete => self.incomplete += 1,
            LinkResult::Stale => self.stale += 1,
            LinkResult::FetchFailed => self.fetch_failures += 1,
        }
    }
}

/// Discovers, scrapes, filters and stores the articles of one category.
pub struct CategoryHarvester {
    links: LinkDiscoverer,
    articles: ArticleFetcher,
    store: Arc<dyn ArticleStore>,
    article_concurrency: usize,
}

impl CategoryHarvester {
    pub fn new(
        links: LinkDiscoverer,
        articles: ArticleFetcher,
        store: Arc<dyn ArticleStore>,
        article_concurrency: usize,
    ) -> Self {
        Self {
            links,
            articles,
            store,
            article_concurrency: article_concurrency.max(1),
        }
    }

    /// Harvester for the popsci layout, sharing one fetcher for listings and articles.
    pub fn from_config(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ArticleStore>,
        config: &HarvestConfig,
    ) -> Result<Self> {
        let extractor = FieldExtractor::new(popsci::article_layout()?, config)?;
        let links = LinkDiscoverer::new(fetcher.clone(), popsci::LISTING_SELECTOR, config.page_concurrency)?;
        let articles = ArticleFetcher::new(fetcher, Arc::new(extractor));
        Ok(Self::new(links, articles, store, config.article_concurrency))
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    pub fn articles(&self) -> &ArticleFetcher {
        &self.articles
    }

    /// Links are processed independently; a failure on one never affects the others.
    #[instrument(level = "info", skip_all, fields(category = %category.name))]
    pub async fn harvest(&self, category: &Category) -> HarvestReport {
        let collection = category.collection();
        let links = self
            .links
            .discover(&category.url, &category.keyword, category.pages)
            .await;

        let mut report = HarvestReport {
            category: category.name.clone(),
            links: links.len(),
            ..Default::default()
        };

        let results: Vec<LinkResult> = stream::iter(links)
            .map(|url| {
                let collection = collection.as_str();
                async move { self.process_link(&url, collection).await }
            })
            .buffer_unordered(self.article_concurrency)
            .collect()
            .await;

        for result in results {
            report.record(result);
        }

        info!(
            links = report.links,
            stored = report.stored,
            incomplete = report.incomplete,
            stale = report.stale,
            fetch_failures = report.fetch_failures,
            insert_failures = report.insert_failures,
            "Category harvested"
        );
        report
    }

    async fn process_link(&self, url: &str, collection: &str) -> LinkResult {
        let article = match self.articles.scrape_article(url).await {
            ArticleOutcome::Scraped(article) => article,
            ArticleOutcome::Stale => return LinkResult::Stale,
            ArticleOutcome::Failed => return LinkResult::FetchFailed,
        };

        let missing = article.missing_fields();
        let Some(record) = article.into_record() else {
            debug!(%url, ?missing, "Dropping incomplete article");
            return LinkResult::Incomplete;
        };

        match self.store.insert(collection, &record).await {
            Ok(id) => {
                debug!(%url, %id, "Stored article");
                LinkResult::Stored
            }
            Err(e) => {
                error!(%url, collection, error = %e, "Error inserting article");
                LinkResult::InsertFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ps_core::{ArticleField, ArticleRecord, Error, StoredArticle};
    use ps_storage::MemoryStorage;
    use std::collections::HashMap;
    use crate::links::listing_page_url;

    const LISTING: &str = "https://www.popsci.com/category/health";

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    /// Rejects inserts of articles whose title starts with "Reject".
    struct PickyStore(MemoryStorage);

    #[async_trait]
    impl ArticleStore for PickyStore {
        async fn clear(&self, collection: &str) -> Result<()> {
            self.0.clear(collection).await
        }

        async fn insert(&self, collection: &str, record: &ArticleRecord) -> Result<String> {
            if record.title.starts_with("Reject") {
                return Err(Error::Storage("insert rejected".to_string()));
            }
            self.0.insert(collection, record).await
        }

        async fn list_by_collections(&self, collections: &[String]) -> Result<Vec<StoredArticle>> {
            self.0.list_by_collections(collections).await
        }

        async fn distinct_values(&self, field: ArticleField, collection: &str) -> Result<Vec<String>> {
            self.0.distinct_values(field, collection).await
        }

        async fn list_collection_names(&self) -> Result<Vec<String>> {
            self.0.list_collection_names().await
        }
    }

    fn article_page(title: &str, datetime: &str) -> String {
        format!(
            r#"<html><body>
              <h1 class="u-entryTitle">{title}</h1>
              <p class="Article-excerpt">Excerpt</p>
              <p class="Article-author">Pat Writer</p>
              <time datetime="{datetime}"></time>
              <div class="orgnc-SingleImage-wrapper"><img src="https://img.popsci.com/x.jpg"></div>
              <section class="Article-bodyText">Body text</section>
            </body></html>"#
        )
    }

    fn site(articles: &[(&str, String)]) -> HashMap<String, String> {
        let cards: String = articles
            .iter()
            .map(|(url, _)| format!(r#"<article><a href="{}">x</a></article>"#, url))
            .collect();
        let mut pages: HashMap<String, String> = articles
            .iter()
            .map(|(url, html)| (url.to_string(), html.clone()))
            .collect();
        pages.insert(
            listing_page_url(LISTING, 1),
            format!(r#"<div class="PostsContainer-list">{}</div>"#, cards),
        );
        pages
    }

    fn harvester(pages: HashMap<String, String>, store: Arc<dyn ArticleStore>) -> CategoryHarvester {
        CategoryHarvester::from_config(Arc::new(MapFetcher(pages)), store, &HarvestConfig::default()).unwrap()
    }

    fn category() -> Category {
        Category::new("health", LISTING, "health", 1)
    }

    #[tokio::test]
    async fn test_harvest_filters_and_stores() {
        let pages = site(&[
            ("https://www.popsci.com/health/good/", article_page("Good", "2023-03-01T00:00:00Z")),
            ("https://www.popsci.com/health/old/", article_page("Old", "2020-03-01T00:00:00Z")),
            (
                "https://www.popsci.com/health/no-date/",
                article_page("No date", "2023-03-01T00:00:00Z").replace(r#"<time datetime="2023-03-01T00:00:00Z"></time>"#, ""),
            ),
        ]);
        let store = Arc::new(MemoryStorage::new());
        let report = harvester(pages, store.clone()).harvest(&category()).await;

        assert_eq!(report.links, 3);
        assert_eq!(report.stored, 1);
        assert_eq!(report.stale, 1);
        assert_eq!(report.incomplete, 1);
        assert_eq!(report.fetch_failures, 0);

        let stored = store
            .list_by_collections(&["health_articles".to_string()])
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.title, "Good");
        assert_eq!(stored[0].record.genre, "health");
        assert_eq!(stored[0].record.publish_date, "March 01th, 2023");
    }

    #[tokio::test]
    async fn test_insert_failure_is_isolated() {
        let pages = site(&[
            ("https://www.popsci.com/health/a/", article_page("Reject me", "2023-03-01T00:00:00Z")),
            ("https://www.popsci.com/health/b/", article_page("Keep me", "2023-03-02T00:00:00Z")),
        ]);
        let store = Arc::new(PickyStore(MemoryStorage::new()));
        let report = harvester(pages, store.clone()).harvest(&category()).await;

        assert_eq!(report.insert_failures, 1);
        assert_eq!(report.stored, 1);
        let stored = store
            .list_by_collections(&["health_articles".to_string()])
            .await
            .unwrap();
        assert_eq!(stored[0].record.title, "Keep me");
    }

    #[tokio::test]
    async fn test_failed_listing_stores_nothing() {
        let store = Arc::new(MemoryStorage::new());
        let report = harvester(HashMap::new(), store.clone()).harvest(&category()).await;
        assert_eq!(report, HarvestReport {
            category: "health".to_string(),
            ..Default::default()
        });
    }
}
