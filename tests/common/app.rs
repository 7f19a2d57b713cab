use std::sync::Arc;

use axum_test::TestServer;
use pubhub::build_router;
use pubhub::config::{Config, LogFormat, StoreBackend};
use pubhub::state::AppState;
use pubhub::store::InMemoryStore;

/// Test configuration
pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        jwt_secret: "test-jwt-secret-that-is-at-least-32-characters-long".to_string(),
        jwt_expiration_hours: 24,
        host: "127.0.0.1".to_string(),
        port: 0,
        log_format: LogFormat::Pretty,
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = test_config();

        // Every test gets its own store, so ids start at 1
        let state = AppState::with_store(config, Arc::new(InMemoryStore::new()));

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }

    /// Test application over PostgreSQL, migrated on connect.
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite still runs
    /// without a database.
    #[allow(dead_code)]
    pub async fn postgres() -> Option<Self> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let config = Config {
            store_backend: StoreBackend::Postgres,
            database_url: Some(database_url),
            database_max_connections: 5,
            ..test_config()
        };

        let state = AppState::new(config)
            .await
            .expect("Failed to connect test database");

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Some(Self { server, state })
    }
}
