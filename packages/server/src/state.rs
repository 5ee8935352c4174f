use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::cache::ResponseCache;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            cache: Arc::new(ResponseCache::new()),
        }
    }
}
