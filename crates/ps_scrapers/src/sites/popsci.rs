//! Markup of www.popsci.com category listings and article pages.
//!
//! Articles have been published under several templates over the years, so
//! most fields carry more than one strategy.

use ps_core::Result;
use crate::extractor::{ArticleLayout, Strategy};

/// Anchors of the article cards on a category listing page.
pub const LISTING_SELECTOR: &str = ".PostsContainer-list article a";

pub fn article_layout() -> Result<ArticleLayout> {
    Ok(ArticleLayout {
        title: vec![
            Strategy::text("h1.u-entryTitle")?,
            Strategy::text("h1.Article-title")?,
        ],
        excerpt: vec![Strategy::text("p.Article-excerpt")?],
        author: vec![
            Strategy::collapsed_text("a.fn.author-link")?,
            Strategy::collapsed_text("a.ArticleReviewAuthor-name.author-link")?,
            Strategy::collapsed_text("p.Article-author")?,
        ],
        image: vec![Strategy::nested_attr("div.orgnc-SingleImage-wrapper", "img", "src")?],
        body: vec![
            Strategy::text("section.Article-bodyText")?,
            // paywalled template
            Strategy::text("div.Article-bodyText.paywall")?,
        ],
        publish_time: Strategy::attr("time", "datetime")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_layout_compiles() {
        let layout = article_layout().unwrap();
        assert_eq!(layout.title.len(), 2);
        assert_eq!(layout.author.len(), 3);
        assert_eq!(layout.body.len(), 2);
        assert!(Selector::parse(LISTING_SELECTOR).is_ok());
    }
}
