//! Server state
//!
//! [`ServerState`] holds the shared handles every handler needs: the
//! configuration and the database pool. Cloning is cheap, the pool is
//! reference counted.

use crate::core::Config;
use crate::db::DbService;
use crate::sync::SyncEngine;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub db: SqlitePool,
}

impl ServerState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self { config, db }
    }

    /// Initialize the state: ensure the working directory exists and
    /// open the database (running migrations).
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_service = DbService::new(&config.database_path)
            .await
            .map_err(|e| anyhow::anyhow!("database init failed: {}", e.message))?;

        Ok(Self::new(config.clone(), db_service.pool))
    }

    /// Reconciliation engine bound to this state's pool
    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(self.db.clone())
    }
}
