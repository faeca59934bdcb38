//! # taxi-service
//!
//! Server-rendered fleet management for a taxi company: manufacturers, cars
//! and drivers, each with searchable paginated listings, detail pages, and
//! create/update/delete forms behind a login, plus a staff-only admin
//! console.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taxi_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TaxiConfig::load()?;
//!     observability::init()?;
//!
//!     let pool = db::connect(&config.database).await?;
//!     db::migrate(&pool).await?;
//!
//!     let state = AppState::new(config, pool);
//!     let app = routes::build_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod template;

/// Prelude module for convenient imports
///
/// ```rust
/// use taxi_service::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{
        Authenticated, FlashMessage, PasswordHasher, Session, SessionData, SessionId, StaffUser,
    };
    pub use crate::config::TaxiConfig;
    pub use crate::db;
    pub use crate::error::TaxiError;
    pub use crate::forms::{FormBuilder, ValidationErrors};
    pub use crate::models::{Car, Driver, Manufacturer};
    pub use crate::observability;
    pub use crate::pagination::{Page, Paginator, PAGE_SIZE};
    pub use crate::routes;
    pub use crate::state::AppState;
    pub use crate::template::RenderTemplate;
}
