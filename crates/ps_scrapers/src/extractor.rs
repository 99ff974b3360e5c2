//! Field extraction over a parsed article page.
//!
//! Each field is described by an ordered list of [`Strategy`] values. The
//! first strategy that yields a non-empty value wins; when none does the
//! field falls back to its sentinel. Missing markup never aborts extraction.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ps_core::{ArticleField, Error, Field, HarvestConfig, Result, ScrapedArticle};
use scraper::{ElementRef, Html, Selector};

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", css, e)))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// One way of locating a field value in a page.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Trimmed text of the first matching element
    Text(Selector),
    /// Text of the first matching element with inner whitespace collapsed
    CollapsedText(Selector),
    /// Attribute of the first matching element
    Attr(Selector, &'static str),
    /// Attribute of the first `inner` element inside the first `container`
    NestedAttr {
        container: Selector,
        inner: Selector,
        attr: &'static str,
    },
}

impl Strategy {
    pub fn text(css: &str) -> Result<Self> {
        Ok(Strategy::Text(parse_selector(css)?))
    }

    pub fn collapsed_text(css: &str) -> Result<Self> {
        Ok(Strategy::CollapsedText(parse_selector(css)?))
    }

    pub fn attr(css: &str, attr: &'static str) -> Result<Self> {
        Ok(Strategy::Attr(parse_selector(css)?, attr))
    }

    pub fn nested_attr(container: &str, inner: &str, attr: &'static str) -> Result<Self> {
        Ok(Strategy::NestedAttr {
            container: parse_selector(container)?,
            inner: parse_selector(inner)?,
            attr,
        })
    }

    pub fn apply(&self, document: &Html) -> Option<String> {
        match self {
            Strategy::Text(selector) => document
                .select(selector)
                .next()
                .map(element_text)
                .and_then(non_empty),
            Strategy::CollapsedText(selector) => document
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
                .and_then(non_empty),
            Strategy::Attr(selector, attr) => document
                .select(selector)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .and_then(non_empty),
            Strategy::NestedAttr { container, inner, attr } => document
                .select(container)
                .next()?
                .select(inner)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .and_then(non_empty),
        }
    }
}

/// Evaluates strategies in order and returns the first value found.
pub fn first_match(strategies: &[Strategy], document: &Html) -> Option<String> {
    strategies.iter().find_map(|s| s.apply(document))
}

/// Where each field lives in one site's article markup.
#[derive(Debug, Clone)]
pub struct ArticleLayout {
    pub title: Vec<Strategy>,
    pub excerpt: Vec<Strategy>,
    pub author: Vec<Strategy>,
    pub image: Vec<Strategy>,
    pub body: Vec<Strategy>,
    /// Element carrying the raw publish datetime
    pub publish_time: Strategy,
}

#[derive(Debug, Clone)]
pub enum Extraction {
    Article(ScrapedArticle),
    /// The page's datetime did not contain the recency marker
    Stale { datetime: String },
}

#[derive(Debug, Clone)]
pub struct FieldExtractor {
    layout: ArticleLayout,
    recency_marker: String,
    genre_segment: usize,
    date_format: String,
}

impl FieldExtractor {
    pub fn new(layout: ArticleLayout, config: &HarvestConfig) -> Result<Self> {
        if StrftimeItems::new(&config.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!("Invalid date format: {}", config.date_format)));
        }
        Ok(Self {
            layout,
            recency_marker: config.recency_marker.clone(),
            genre_segment: config.genre_segment,
            date_format: config.date_format.clone(),
        })
    }

    pub fn extract_html(&self, url: &str, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        self.extract(url, &document)
    }

    pub fn extract(&self, url: &str, document: &Html) -> Extraction {
        let publish_date = match self.layout.publish_time.apply(document) {
            Some(raw) if !raw.contains(&self.recency_marker) => {
                return Extraction::Stale { datetime: raw };
            }
            Some(raw) => Field::from_option(
                ArticleField::PublishDate,
                parse_publish_date(&raw).map(|d| d.format(&self.date_format).to_string()),
            ),
            None => Field::Missing(ArticleField::PublishDate),
        };

        let field = |kind: ArticleField, strategies: &[Strategy]| {
            Field::from_option(kind, first_match(strategies, document))
        };

        Extraction::Article(ScrapedArticle {
            url: url.to_string(),
            title: field(ArticleField::Title, &self.layout.title),
            author: field(ArticleField::Author, &self.layout.author),
            excerpt: field(ArticleField::Excerpt, &self.layout.excerpt),
            genre: Field::from_option(ArticleField::Genre, genre_from_url(url, self.genre_segment)),
            image: field(ArticleField::Image, &self.layout.image),
            publish_date,
            body: field(ArticleField::Body, &self.layout.body),
        })
    }
}

/// Segment `index` of the URL split on "/". Split positions are literal, so
/// for `https://host/a/b` index 0 is `https:`, index 1 is empty and index 3
/// is `a`.
pub fn genre_from_url(url: &str, index: usize) -> Option<String> {
    url.split('/')
        .nth(index)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Accepts RFC 3339, naive ISO datetimes and anything starting with an ISO date.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
