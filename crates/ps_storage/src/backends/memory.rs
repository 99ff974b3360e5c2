use async_trait::async_trait;
use ps_core::{ArticleField, ArticleRecord, ArticleStore, Result, StoredArticle};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<StoredArticle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, collection: &str) {
        // The partition keeps existing once created, like a dropped-rows table.
        self.collections.entry(collection.to_string()).or_default().clear();
    }

    pub fn insert(&mut self, collection: &str, record: &ArticleRecord) -> String {
        let id = Uuid::new_v4().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredArticle {
                id: id.clone(),
                record: record.clone(),
            });
        id
    }

    pub fn list_by_collections(&self, collections: &[String]) -> Vec<StoredArticle> {
        collections
            .iter()
            .filter_map(|name| self.collections.get(name))
            .flat_map(|articles| articles.iter().cloned())
            .collect()
    }

    pub fn distinct_values(&self, field: ArticleField, collection: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.collections
            .get(collection)
            .map(|articles| {
                articles
                    .iter()
                    .map(|a| a.record.value(field).to_string())
                    .filter(|v| seen.insert(v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Process-local store, used by tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn clear(&self, collection: &str) -> Result<()> {
        self.store.write().await.clear(collection);
        Ok(())
    }

    async fn insert(&self, collection: &str, record: &ArticleRecord) -> Result<String> {
        Ok(self.store.write().await.insert(collection, record))
    }

    async fn list_by_collections(&self, collections: &[String]) -> Result<Vec<StoredArticle>> {
        Ok(self.store.read().await.list_by_collections(collections))
    }

    async fn distinct_values(&self, field: ArticleField, collection: &str) -> Result<Vec<String>> {
        Ok(self.store.read().await.distinct_values(field, collection))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.store.read().await.collection_names())
    }
}
