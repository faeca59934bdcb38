//! Askama page rendering
//!
//! Every page template carries a [`PageContext`] with the logged-in driver,
//! the flash messages to show once and the session's CSRF token.
//! [`RenderTemplate`] turns a template into a response, logging and
//! answering 500 when rendering fails.
//!
//! ```rust
//! use askama::Template;
//! use taxi_service::template::RenderTemplate;
//!
//! #[derive(Template)]
//! #[template(source = "<h1>{{ title }}</h1>", ext = "html")]
//! struct Heading {
//!     title: String,
//! }
//!
//! let response = Heading { title: "Cars".into() }.render_html();
//! assert_eq!(response.status(), 200);
//! ```

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::auth::{FlashMessage, Session};
use crate::models::Driver;

/// Data shared by every page: who is logged in and pending flash messages
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in driver
    pub viewer: Option<Driver>,
    /// Messages queued by earlier requests
    pub messages: Vec<FlashMessage>,
    /// Token echoed back by every form that posts
    pub csrf_token: String,
}

impl PageContext {
    /// Context for a logged-in driver, draining the session's flash messages
    #[must_use]
    pub fn new(viewer: Driver, session: &Session) -> Self {
        Self {
            viewer: Some(viewer),
            messages: session.take_flashes(),
            csrf_token: session.csrf_token(),
        }
    }

    /// Context for a visitor who is not logged in
    #[must_use]
    pub fn anonymous(session: &Session) -> Self {
        Self {
            viewer: None,
            messages: session.take_flashes(),
            csrf_token: session.csrf_token(),
        }
    }

    /// Whether the viewer may open the admin console
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.viewer.as_ref().is_some_and(|d| d.is_staff)
    }
}

/// Render an Askama template into an HTML response
pub trait RenderTemplate: Template {
    /// Render with `200 OK`
    fn render_html(&self) -> Response {
        self.render_with_status(StatusCode::OK)
    }

    /// Render with the given status, e.g. `422` for a form with errors
    fn render_with_status(&self, status: StatusCode) -> Response {
        match self.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
            }
        }
    }
}

impl<T: Template> RenderTemplate for T {}
