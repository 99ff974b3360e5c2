pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::HarvestConfig;
pub use error::{Error, Result};
pub use storage::ArticleStore;
pub use types::{ArticleField, ArticleRecord, Category, Field, ScrapedArticle, StoredArticle};
