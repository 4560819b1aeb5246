use std::sync::Arc;

use cardvault_core::ingest::FileBatchIngestor;
use cardvault_db::card_store::PgCardStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cardvault_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Batch file ingestor backed by the same pool.
    pub ingestor: Arc<FileBatchIngestor<PgCardStore>>,
}

impl AppState {
    pub fn new(pool: cardvault_db::DbPool, config: ServerConfig) -> Self {
        let ingestor = FileBatchIngestor::new(PgCardStore::new(pool.clone()))
            .with_policy(config.upload_consistency);
        Self {
            pool,
            config: Arc::new(config),
            ingestor: Arc::new(ingestor),
        }
    }
}
