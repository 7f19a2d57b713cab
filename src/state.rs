use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::{Config, StoreBackend};
use crate::store::{InMemoryStore, ResourceStore, SeaOrmStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The Resource Store every service call goes through
    pub store: Arc<dyn ResourceStore>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState, connecting to the configured store backend
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let store: Arc<dyn ResourceStore> = match config.store_backend {
            StoreBackend::Postgres => Arc::new(connect_postgres(&config).await?),
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Ok(Self { store, config })
    }

    /// Create AppState around an existing store (for testing)
    pub fn with_store(config: Config, store: Arc<dyn ResourceStore>) -> Self {
        Self { store, config }
    }

    /// Borrow the store as a trait object for service calls
    pub fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }
}

async fn connect_postgres(config: &Config) -> Result<SeaOrmStore, AppStateError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppStateError::Postgres("DATABASE_URL is not set".to_string()))?;

    // Connect to PostgreSQL with SQLx (for migrations)
    let pg_pool = PgPool::connect(database_url)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .map_err(|e| AppStateError::Migration(e.to_string()))?;
    pg_pool.close().await;

    // Connect to PostgreSQL with SeaORM
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(config.database_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(true);

    let db = Database::connect(opt)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "PostgreSQL store ready"
    );
    Ok(SeaOrmStore::new(db))
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
