//! Login and logout handlers
//!
//! ```rust,ignore
//! use taxi_service::auth::handlers::{login_form, login_post, logout, logout_form};
//! use axum::{Router, routing::get};
//!
//! let app = Router::new()
//!     .route("/accounts/login/", get(login_form).post(login_post))
//!     .route("/accounts/logout/", get(logout_form).post(logout));
//! ```

use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::session::{FlashMessage, Session};
use crate::error::TaxiError;
use crate::forms::{LoginForm, ValidationErrors, INVALID_LOGIN};
use crate::models::Driver;
use crate::state::AppState;
use crate::template::{PageContext, RenderTemplate};

#[derive(Template)]
#[template(path = "registration/login.html")]
struct LoginPage {
    ctx: PageContext,
    form: String,
}

#[derive(Template)]
#[template(path = "registration/logout.html")]
struct LogoutPage {
    ctx: PageContext,
}

/// `?next=` on the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    /// Path to return to after logging in
    pub next: Option<String>,
}

fn login_page(
    state: &AppState,
    session: &Session,
    form: &LoginForm,
    errors: &ValidationErrors,
) -> LoginPage {
    let ctx = PageContext::anonymous(session);
    let form = form.render(&state.config().login_path, &ctx.csrf_token, errors);
    LoginPage { ctx, form }
}

/// GET /accounts/login/ - show the login form
pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParam>,
) -> Response {
    let form = LoginForm::with_next(params.next);
    login_page(&state, &session, &form, &ValidationErrors::new()).render_html()
}

/// POST /accounts/login/ - check credentials and start the session
///
/// Redirects to `next` when it is a local path. Wrong credentials or an
/// inactive account re-render the form with status 422.
///
/// # Errors
///
/// Returns [`TaxiError`] if the database or the stored hash is broken
pub async fn login_post(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, TaxiError> {
    let mut errors = form.errors();

    if !errors.has_errors() {
        let driver = Driver::authenticate(
            state.pool(),
            state.hasher(),
            &form.username,
            &form.password,
        )
        .await?;

        if let Some(driver) = driver {
            Driver::record_login(state.pool(), driver.id).await?;
            session.login(driver.id);
            session.add_flash(FlashMessage::success(format!("Welcome, {}.", driver.username)));
            tracing::info!(driver_id = driver.id, "driver logged in");
            return Ok(Redirect::to(form.redirect_target()).into_response());
        }

        tracing::info!(username = %form.username, "login rejected");
        errors.add_non_field(INVALID_LOGIN);
    }

    Ok(login_page(&state, &session, &form, &errors)
        .render_with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

/// GET /accounts/logout/ - ask before ending the session
///
/// Logging out changes state, so it only happens on the POST this page
/// submits.
pub async fn logout_form(session: Session) -> Response {
    LogoutPage {
        ctx: PageContext::anonymous(&session),
    }
    .render_html()
}

/// POST /accounts/logout/ - end the session
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Some(driver_id) = session.user_id() {
        tracing::info!(driver_id, "driver logged out");
    }
    session.flush();
    session.add_flash(FlashMessage::info("You have been logged out."));
    Redirect::to(&state.config().login_path)
}
