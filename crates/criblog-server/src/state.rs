use criblog_core::config::AppConfig;
use criblog_core::records::Dataset;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The shared dataset handle: one logical writer (the archive upload
/// route), any number of readers. `None` until the first ingestion.
pub type DatasetHandle = Arc<RwLock<Option<Dataset>>>;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub dataset: DatasetHandle,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            dataset: Arc::new(RwLock::new(None)),
        }
    }
}
