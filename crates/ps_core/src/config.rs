//! Harvest configuration.
//!
//! Every knob has a default matching the popsci site; a TOML file may
//! override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::types::Category;
use crate::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 Edg/91.0.864.48";

const POPSCI_CATEGORY_URL: &str = "https://www.popsci.com/category";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Categories harvested by a run, in order
    pub categories: Vec<Category>,

    /// Articles whose raw datetime attribute lacks this substring are dropped
    pub recency_marker: String,

    /// Index of the "/"-split URL segment used as the genre
    pub genre_segment: usize,

    /// chrono format string for rendered publish dates
    pub date_format: String,

    pub user_agent: String,
    pub request_timeout_secs: u64,

    /// Listing pages fetched at once per category
    pub page_concurrency: usize,

    /// Articles fetched at once per category
    pub article_concurrency: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            recency_marker: "2023".to_string(),
            genre_segment: 3,
            date_format: "%B %dth, %Y".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            page_concurrency: 2,
            article_concurrency: 8,
        }
    }
}

impl HarvestConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::Config("No categories configured".to_string()));
        }
        if let Some(c) = self.categories.iter().find(|c| c.keyword.is_empty()) {
            return Err(Error::Config(format!("Category {} has an empty keyword", c.name)));
        }
        if self.page_concurrency == 0 || self.article_concurrency == 0 {
            return Err(Error::Config("Concurrency limits must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.collection()).collect()
    }
}

fn default_categories() -> Vec<Category> {
    ["technology", "environment", "science", "health", "gear", "diy"]
        .into_iter()
        .map(|genre| Category::new(genre, &format!("{}/{}", POPSCI_CATEGORY_URL, genre), genre, 2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_categories() {
        let config = HarvestConfig::default();
        let names: Vec<_> = config.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["technology", "environment", "science", "health", "gear", "diy"]);
        assert_eq!(config.categories[0].url, "https://www.popsci.com/category/technology");
        assert!(config.categories.iter().all(|c| c.pages == 2));
        assert_eq!(config.collection_names()[5], "diy_articles");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = HarvestConfig::from_toml(
            r#"
            recency_marker = "2024"
            article_concurrency = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.recency_marker, "2024");
        assert_eq!(config.article_concurrency, 4);
        assert_eq!(config.genre_segment, 3);
        assert_eq!(config.categories.len(), 6);
    }

    #[test]
    fn test_toml_categories() {
        let config = HarvestConfig::from_toml(
            r#"
            [[categories]]
            name = "science"
            url = "https://www.popsci.com/category/science"
            keyword = "science"
            pages = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].pages, 3);
        assert_eq!(config.categories[0].collection(), "science_articles");
    }

    #[test]
    fn test_invalid_config() {
        assert!(HarvestConfig::from_toml("categories = []").is_err());
        assert!(HarvestConfig::from_toml("page_concurrency = 0").is_err());
        assert!(HarvestConfig::from_toml("genre_segment = \"x\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date_format = \"%Y-%m-%d\"").unwrap();
        let config = HarvestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.date_format, "%Y-%m-%d");
    }
}
