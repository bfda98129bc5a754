use std::sync::Arc;

use scigraph_config::ServiceConfig;
use scigraph_store::{DocumentStore, InMemoryStore};

/// Shared application state stashed in the request [`salvo::Depot`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: &'static ServiceConfig,
}

impl AppState {
    pub fn new(config: &'static ServiceConfig) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            config,
        }
    }
}
