use async_trait::async_trait;
use ps_core::{ArticleStore, Error, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStore + Sized {
    fn get_error_message() -> &'static str;

    /// Open the backend; `url` is backend specific (a file path for SQLite).
    async fn connect(url: Option<&str>) -> Result<Self>;
}

/// Names accepted by [`create_storage`].
pub fn available_backends() -> Vec<&'static str> {
    let mut names = vec!["memory"];
    if cfg!(feature = "sqlite") {
        names.push("sqlite");
    }
    names
}

async fn open<T: StorageBackend + 'static>(url: Option<&str>) -> Result<Arc<dyn ArticleStore>> {
    let storage = T::connect(url)
        .await
        .map_err(|e| Error::Storage(format!("{} ({})", T::get_error_message(), e)))?;
    Ok(Arc::new(storage))
}

pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStore>> {
    let storage = match kind {
        "memory" => open::<MemoryStorage>(url).await?,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(url).await?,
        other => {
            return Err(Error::Storage(format!(
                "Unknown storage backend: {} (available: {})",
                other,
                available_backends().join(", ")
            )))
        }
    };
    info!(backend = kind, "Storage backend opened");
    Ok(storage)
}
