// Application state module
// Bundles the loaded configuration with the storage backend handle

use std::sync::Arc;

use super::types::Config;
use crate::storage::ObjectStore;

/// Application state shared across connection tasks.
///
/// The store handle lives here and is passed explicitly into the dispatcher
/// for every request; nothing request-scoped is kept between requests.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }
}
