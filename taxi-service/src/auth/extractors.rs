//! Authentication extractors for axum handlers
//!
//! # Examples
//!
//! ```rust,no_run
//! use taxi_service::auth::{Authenticated, StaffUser};
//!
//! async fn car_list(Authenticated(driver): Authenticated) -> String {
//!     format!("Hello, {}!", driver.username)
//! }
//!
//! async fn admin_index(StaffUser(staff): StaffUser) -> String {
//!     format!("Admin console for {}", staff.username)
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use super::session::Session;
use super::login_url;
use crate::error::TaxiError;
use crate::models::Driver;
use crate::state::AppState;

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = TaxiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| TaxiError::ServerError("session layer is not installed".to_string()))
    }
}

/// The logged-in, active driver
///
/// Rejects with a redirect to the login page (`?next=` set to the requested
/// path), or `401` with `HX-Redirect` for HTMX requests.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Driver);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthenticationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthenticationError::MissingSession)?;

        let not_authenticated = || AuthenticationError::NotAuthenticated {
            location: login_url(&app_state.config().login_path, parts.uri.path_and_query()),
            htmx: is_htmx(parts),
        };

        let user_id = session.user_id().ok_or_else(not_authenticated)?;

        match Driver::find_by_id(app_state.pool(), user_id).await {
            Ok(Some(driver)) if driver.is_active => Ok(Self(driver)),
            Ok(_) => {
                // Account deleted or deactivated since login.
                session.flush();
                Err(not_authenticated())
            }
            Err(e) => Err(AuthenticationError::Database(e)),
        }
    }
}

/// A logged-in driver with staff status, for the admin console
///
/// Anonymous visitors are sent to the login page like [`Authenticated`];
/// logged-in drivers without staff status get `403`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub Driver);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthenticationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(driver) = Authenticated::from_request_parts(parts, state).await?;
        if !driver.is_staff {
            return Err(AuthenticationError::NotStaff);
        }
        Ok(Self(driver))
    }
}

fn is_htmx(parts: &Parts) -> bool {
    parts
        .headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        == Some("true")
}

/// Authentication errors for extractors
#[derive(Debug)]
pub enum AuthenticationError {
    /// No session found in request extensions
    MissingSession,

    /// No driver logged in
    NotAuthenticated {
        /// Login URL including `?next=`
        location: String,
        /// Whether the request came from HTMX
        htmx: bool,
    },

    /// Logged in without staff status
    NotStaff,

    /// Loading the driver failed
    Database(sqlx::Error),
}

impl IntoResponse for AuthenticationError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession => {
                TaxiError::ServerError("session layer is not installed".to_string()).into_response()
            }
            Self::NotAuthenticated { location, htmx: true } => (
                StatusCode::UNAUTHORIZED,
                [("HX-Redirect", location.as_str())],
                "Unauthorized",
            )
                .into_response(),
            Self::NotAuthenticated {
                location,
                htmx: false,
            } => Redirect::to(&location).into_response(),
            Self::NotStaff => {
                TaxiError::Forbidden("staff status required".to_string()).into_response()
            }
            Self::Database(e) => TaxiError::Database(e).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_redirect_response() {
        let response = AuthenticationError::NotAuthenticated {
            location: "/accounts/login/?next=%2Fcars%2F".to_string(),
            htmx: false,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/accounts/login/?next=%2Fcars%2F"
        );
    }

    #[test]
    fn test_htmx_gets_401() {
        let response = AuthenticationError::NotAuthenticated {
            location: "/accounts/login/".to_string(),
            htmx: true,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/accounts/login/");
    }

    #[test]
    fn test_not_staff_is_forbidden() {
        assert_eq!(AuthenticationError::NotStaff.into_response().status(), StatusCode::FORBIDDEN);
    }
}
