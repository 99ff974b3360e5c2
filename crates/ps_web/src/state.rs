use ps_core::ArticleStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ArticleStore>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStore>) -> Self {
        Self { storage }
    }
}
