//! Observability (structured logging)
//!
//! Sets up `tracing` with an environment-driven filter. Debug builds log in a
//! human-readable format, release builds emit JSON lines.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives when `RUST_LOG` is unset
#[must_use]
pub fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,taxi_service=trace,sqlx=warn"
    } else {
        "info,sqlx=warn"
    }
}

/// Initialize logging
///
/// Sets up:
/// - Structured logging with JSON formatting (release) or pretty formatting (debug)
/// - Environment-based level filtering via `RUST_LOG`
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
///
/// # Example
///
/// ```rust,no_run
/// use taxi_service::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("taxi service starting");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}
