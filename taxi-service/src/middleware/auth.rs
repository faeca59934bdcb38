//! Authentication middleware for protecting routes
//!
//! Rejects requests whose session has no logged-in driver before any handler
//! runs. Browsers are redirected to the login page with `?next=` set to the
//! requested path and query; HTMX requests get `401` with `HX-Redirect`.
//!
//! # Example
//!
//! ```rust,no_run
//! use taxi_service::middleware::AuthMiddleware;
//! use axum::{extract::Request, middleware::{self, Next}, routing::get, Router};
//!
//! # fn example() {
//! let auth = AuthMiddleware::with_login_path("/accounts/login/");
//! let app: Router = Router::new()
//!     .route("/cars/", get(|| async { "cars" }))
//!     .layer(middleware::from_fn(move |req: Request, next: Next| auth.clone().handle(req, next)));
//! # }
//! ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{login_url, Session};

/// Middleware that requires a logged-in driver
#[derive(Clone, Debug)]
pub struct AuthMiddleware {
    login_path: String,
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self {
            login_path: "/accounts/login/".to_string(),
        }
    }
}

impl AuthMiddleware {
    /// Middleware redirecting to `/accounts/login/`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Middleware redirecting to a custom login path
    #[must_use]
    pub fn with_login_path(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    /// Let the request through when its session has a driver
    ///
    /// # Errors
    ///
    /// Returns [`AuthMiddlewareError`] when no driver is logged in
    pub async fn handle(
        self,
        request: Request,
        next: Next,
    ) -> Result<Response, AuthMiddlewareError> {
        let is_authenticated = request
            .extensions()
            .get::<Session>()
            .and_then(Session::user_id)
            .is_some();

        if !is_authenticated {
            let location = login_url(&self.login_path, request.uri().path_and_query());
            let is_htmx = request
                .headers()
                .get("HX-Request")
                .and_then(|v| v.to_str().ok())
                == Some("true");

            tracing::debug!(path = %request.uri().path(), "anonymous request to protected route");

            if is_htmx {
                return Err(AuthMiddlewareError::Unauthorized(location));
            }
            return Err(AuthMiddlewareError::RedirectToLogin(location));
        }

        Ok(next.run(request).await)
    }
}

/// Authentication middleware errors
#[derive(Debug)]
pub enum AuthMiddlewareError {
    /// HTMX request without a driver; holds the login URL
    Unauthorized(String),
    /// Browser request without a driver; holds the login URL
    RedirectToLogin(String),
}

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(location) => (
                StatusCode::UNAUTHORIZED,
                [("HX-Redirect", location.as_str())],
                "Unauthorized",
            )
                .into_response(),
            Self::RedirectToLogin(location) => Redirect::to(&location).into_response(),
        }
    }
}
