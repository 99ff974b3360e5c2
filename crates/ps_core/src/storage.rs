use async_trait::async_trait;
use crate::types::{ArticleField, ArticleRecord, StoredArticle};
use crate::Result;

/// Partitioned article store. Each partition ("collection") holds the
/// articles of one category.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Delete every record in a collection
    async fn clear(&self, collection: &str) -> Result<()>;

    /// Append one record, returning the identifier assigned to it
    async fn insert(&self, collection: &str, record: &ArticleRecord) -> Result<String>;

    /// All records across the named collections
    async fn list_by_collections(&self, collections: &[String]) -> Result<Vec<StoredArticle>>;

    /// Distinct values of one field within a collection
    async fn distinct_values(&self, field: ArticleField, collection: &str) -> Result<Vec<String>>;

    /// Names of all existing collections
    async fn list_collection_names(&self) -> Result<Vec<String>>;
}
