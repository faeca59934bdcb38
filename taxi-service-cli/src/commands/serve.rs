//! Run the web server

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use taxi_service::config::TaxiConfig;
use taxi_service::state::AppState;
use taxi_service::{db, observability, routes};

/// Serve the application until Ctrl-C
pub struct ServeCommand {
    config: TaxiConfig,
}

impl ServeCommand {
    /// Command serving with the given configuration
    pub const fn new(config: TaxiConfig) -> Self {
        Self { config }
    }

    /// Connect, migrate, and serve with graceful shutdown
    ///
    /// Expired sessions are purged at startup and every
    /// `session.purge_interval_secs` after that.
    pub async fn execute(self) -> Result<()> {
        observability::init()?;

        let addr = self.config.server.socket_addr()?;
        let pool = db::connect(&self.config.database).await?;
        db::migrate(&pool).await?;

        let purge_every = Duration::from_secs(self.config.session.purge_interval_secs.max(1));
        let state = AppState::new(self.config, pool);
        let purge_task = state.sessions().spawn_purge_task(purge_every);

        let app = routes::build_router(state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        println!(
            "{} {}",
            style("Listening on").green().bold(),
            style(format!("http://{addr}")).cyan()
        );
        tracing::info!(%addr, "taxi service started");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        purge_task.abort();
        tracing::info!("taxi service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
    }
}
