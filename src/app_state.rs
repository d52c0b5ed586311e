use std::sync::Arc;
use tracing::info;

use crate::{
    config::{Config, DatabaseConfig, StorageBackend},
    error::AppResult,
    infrastructure::{InMemoryDatabase, SqliteDatabase, Storage},
    repository::Repositories,
};

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = open_storage(&config.database).await?;
        info!(backend = storage.backend_name(), "storage initialized");
        Ok(Self::with_storage(storage, config))
    }

    pub fn with_storage(storage: Arc<dyn Storage>, config: Config) -> Self {
        Self {
            repositories: Repositories::new(storage),
            config,
        }
    }
}

/// Build the storage variant selected by `config.backend`
pub async fn open_storage(config: &DatabaseConfig) -> AppResult<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteDatabase::connect(config).await?),
        StorageBackend::Memory => Arc::new(InMemoryDatabase::new()),
    };
    Ok(storage)
}
