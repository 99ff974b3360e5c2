use async_trait::async_trait;
use ps_core::{ArticleField, ArticleStore, Category, Error, HarvestConfig, Result};
use ps_scrapers::links::listing_page_url;
use ps_scrapers::{CategoryHarvester, HarvestRunner, PageFetcher};
use ps_storage::MemoryStorage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SCIENCE: &str = "https://www.popsci.com/category/science";

/// In-memory site: serves known pages, 404s everything else, records requests.
#[derive(Default)]
struct FakeSite {
    pages: Mutex<HashMap<String, String>>,
    requested: Mutex<Vec<String>>,
}

impl FakeSite {
    fn put(&self, url: &str, html: String) {
        self.pages.lock().unwrap().insert(url.to_string(), html);
    }

    fn requests_for(&self, url: &str) -> usize {
        self.requested.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.lock().unwrap().get(url).cloned().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn listing(hrefs: &[&str]) -> String {
    let cards: String = hrefs
        .iter()
        .map(|h| format!(r#"<article class="card"><a href="{h}"><h2>card</h2></a></article>"#))
        .collect();
    format!(r#"<html><body><div class="PostsContainer-list">{cards}</div></body></html>"#)
}

fn article(title: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
          <h1 class="u-entryTitle">{title}</h1>
          <p class="Article-excerpt">What you need to know.</p>
          <a class="fn author-link" href="/authors/x">Alex   Reporter</a>
          <time datetime="2023-09-14T08:30:00-04:00">Sep 14</time>
          <div class="orgnc-SingleImage-wrapper"><figure><img src="https://img.popsci.com/{title}.jpg"></figure></div>
          <section class="Article-bodyText"><p>Paragraph one.</p><p>Paragraph two.</p></section>
        </body></html>"#
    )
}

fn science_runner(site: Arc<FakeSite>, store: Arc<MemoryStorage>) -> HarvestRunner {
    let config = HarvestConfig {
        categories: vec![Category::new("science", SCIENCE, "science", 1)],
        ..HarvestConfig::default()
    };
    let harvester = CategoryHarvester::from_config(site, store, &config).unwrap();
    HarvestRunner::new(harvester, config.categories)
}

#[tokio::test]
async fn test_one_article_404_among_three() {
    let site = Arc::new(FakeSite::default());
    let links = [
        "https://www.popsci.com/science/first/",
        "https://www.popsci.com/science/second/",
        "https://www.popsci.com/science/third/",
    ];
    site.put(&listing_page_url(SCIENCE, 1), listing(&links));
    site.put(links[0], article("first"));
    site.put(links[2], article("third"));

    let store = Arc::new(MemoryStorage::new());
    let report = science_runner(site.clone(), store.clone()).run().await;

    let science = &report.categories[0];
    assert_eq!(science.links, 3);
    assert_eq!(science.fetch_failures, 1);
    assert_eq!(science.stored, 2);
    for link in links {
        assert_eq!(site.requests_for(link), 1, "{} fetched once", link);
    }

    let stored = store
        .list_by_collections(&["science_articles".to_string()])
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    for article in &stored {
        for field in ArticleField::ALL {
            let value = article.record.value(field);
            assert_ne!(value, field.sentinel());
            assert!(!value.is_empty());
        }
        assert_eq!(article.record.author, "Alex Reporter");
        assert_eq!(article.record.genre, "science");
        assert_eq!(article.record.publish_date, "September 14th, 2023");
    }
}

#[tokio::test]
async fn test_rerun_replaces_category_content() {
    let site = Arc::new(FakeSite::default());
    site.put(
        &listing_page_url(SCIENCE, 1),
        listing(&["https://www.popsci.com/science/a/", "https://www.popsci.com/science/b/"]),
    );
    site.put("https://www.popsci.com/science/a/", article("a"));
    site.put("https://www.popsci.com/science/b/", article("b"));

    let store = Arc::new(MemoryStorage::new());
    let runner = science_runner(site.clone(), store.clone());
    runner.run().await;
    runner.run().await;

    let titles = |articles: Vec<ps_core::StoredArticle>| {
        let mut titles: Vec<String> = articles.into_iter().map(|a| a.record.title).collect();
        titles.sort();
        titles
    };
    let collections = ["science_articles".to_string()];
    assert_eq!(titles(store.list_by_collections(&collections).await.unwrap()), ["a", "b"]);

    // The listing moves on: only the new article survives the next run.
    site.put(&listing_page_url(SCIENCE, 1), listing(&["https://www.popsci.com/science/c/"]));
    site.put("https://www.popsci.com/science/c/", article("c"));
    runner.run().await;
    assert_eq!(titles(store.list_by_collections(&collections).await.unwrap()), ["c"]);
}

#[tokio::test]
async fn test_off_keyword_links_are_never_fetched() {
    let site = Arc::new(FakeSite::default());
    site.put(
        &listing_page_url(SCIENCE, 1),
        listing(&["https://www.popsci.com/science/kept/", "https://www.popsci.com/deals/ad/"]),
    );
    site.put("https://www.popsci.com/science/kept/", article("kept"));

    let store = Arc::new(MemoryStorage::new());
    let report = science_runner(site.clone(), store).run().await;

    assert_eq!(report.categories[0].links, 1);
    assert_eq!(site.requests_for("https://www.popsci.com/deals/ad/"), 0);
}
