//! Apply pending migrations

use anyhow::Result;
use console::style;
use taxi_service::config::TaxiConfig;
use taxi_service::db;

/// Bring the database schema up to date
pub struct MigrateCommand {
    config: TaxiConfig,
}

impl MigrateCommand {
    /// Command against the configured database
    pub const fn new(config: TaxiConfig) -> Self {
        Self { config }
    }

    /// Connect and run every pending migration
    pub async fn execute(&self) -> Result<()> {
        println!(
            "{} {}",
            style("Migrating").green().bold(),
            style(&self.config.database.url).cyan()
        );

        let pool = db::connect(&self.config.database).await?;
        db::migrate(&pool).await?;
        pool.close().await;

        println!("{}", style("✓ Database is up to date").green());
        Ok(())
    }
}
