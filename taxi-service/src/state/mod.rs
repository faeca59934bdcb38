//! Application state shared by every handler
//!
//! Cloned per request by axum; the pool is already reference-counted and the
//! rest sits behind `Arc`.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{PasswordHasher, SessionStore};
use crate::config::TaxiConfig;

/// State handed to the router with `.with_state()`
///
/// # Example
///
/// ```rust,no_run
/// use taxi_service::{config::TaxiConfig, db, state::AppState};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = TaxiConfig::load()?;
/// let pool = db::connect(&config.database).await?;
/// let state = AppState::new(config, pool);
///
/// let app: axum::Router = axum::Router::new()
///     .route("/health", axum::routing::get(|| async { "ok" }))
///     .with_state(state);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<TaxiConfig>,
    pool: SqlitePool,
    hasher: Arc<PasswordHasher>,
}

impl AppState {
    /// Build state from loaded configuration and a connected pool
    #[must_use]
    pub fn new(config: TaxiConfig, pool: SqlitePool) -> Self {
        let hasher = PasswordHasher::with_config(config.password.clone());
        Self {
            config: Arc::new(config),
            pool,
            hasher: Arc::new(hasher),
        }
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &TaxiConfig {
        &self.config
    }

    /// Database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Password hasher built from `config.password`
    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Session storage on the same pool
    #[must_use]
    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(self.pool.clone())
    }
}
