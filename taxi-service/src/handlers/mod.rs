//! Page handlers
//!
//! One module per entity for the fleet pages, plus the home page and the
//! staff-only admin console. Every handler here requires a logged-in driver
//! through the [`Authenticated`](crate::auth::Authenticated) or
//! [`StaffUser`](crate::auth::StaffUser) extractor.
//!
//! Mutations follow post/redirect/get: success queues a flash message and
//! answers `303 See Other`, a form with errors is re-rendered with `422`.

pub mod admin;
pub mod cars;
pub mod drivers;
pub mod home;
pub mod manufacturers;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::{FlashMessage, Session};
use crate::template::{PageContext, RenderTemplate};

/// Generic create/update page wrapping a rendered form
#[derive(Template)]
#[template(path = "taxi/form.html")]
pub(crate) struct FormPage {
    pub ctx: PageContext,
    pub title: String,
    pub form: String,
    pub cancel_url: String,
}

impl FormPage {
    pub(crate) fn new(
        ctx: PageContext,
        title: impl Into<String>,
        form: String,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            title: title.into(),
            form,
            cancel_url: cancel_url.into(),
        }
    }

    /// Re-render after a failed submission
    pub(crate) fn rejected(&self) -> Response {
        self.render_with_status(StatusCode::UNPROCESSABLE_ENTITY)
    }
}

/// "Are you sure?" page in front of a delete
#[derive(Template)]
#[template(path = "taxi/confirm_delete.html")]
pub(crate) struct ConfirmDeletePage {
    pub ctx: PageContext,
    pub kind: &'static str,
    pub object: String,
    pub action: String,
    pub cancel_url: String,
}

/// Queue a success message and redirect with `303`
pub(crate) fn done(session: &Session, message: impl Into<String>, location: &str) -> Response {
    session.add_flash(FlashMessage::success(message));
    Redirect::to(location).into_response()
}
