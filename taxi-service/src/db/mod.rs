//! Database connection and migrations
//!
//! SQLite through sqlx. Foreign keys are enforced on every connection so the
//! cascade rules in the schema apply (deleting a manufacturer removes its
//! cars, deleting a car or driver removes their assignments).

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseSettings;
use crate::error::TaxiError;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open a connection pool
///
/// # Errors
///
/// Returns [`TaxiError::Database`] if the URL is invalid or the database
/// cannot be opened
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, TaxiError> {
    let options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(settings.create_if_missing)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await?;

    tracing::debug!(url = %settings.url, "database pool ready");
    Ok(pool)
}

/// Apply pending migrations
///
/// # Errors
///
/// Returns [`TaxiError::Migration`] if a migration fails
pub async fn migrate(pool: &SqlitePool) -> Result<(), TaxiError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Migrated in-memory database on a single long-lived connection
///
/// An in-memory SQLite database lives as long as its connection, so the pool
/// holds exactly one connection and never recycles it.
///
/// # Errors
///
/// Returns [`TaxiError`] if the connection or migrations fail
pub async fn memory_pool() -> Result<SqlitePool, TaxiError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Turn a search term into a `LIKE` pattern matching it as a substring
///
/// `%`, `_` and `\` in the term are escaped; queries using the pattern must
/// declare `ESCAPE '\'`.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
