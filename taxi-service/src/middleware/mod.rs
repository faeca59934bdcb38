//! Request middleware: cookie sessions, CSRF checks and login gating

pub mod auth;
pub mod csrf;
pub mod session;

pub use auth::{AuthMiddleware, AuthMiddlewareError};
pub use csrf::{CsrfLayer, CsrfMiddleware, CSRF_FORM_FIELD, CSRF_HEADER_NAME};
pub use session::{SessionLayer, SessionMiddleware};
