//! CSRF protection for state-changing requests
//!
//! POST, PUT, PATCH and DELETE requests must echo the session's token, either
//! in the `x-csrf-token` header (sent by HTMX through `hx-headers`) or in the
//! `csrf_token` field of an urlencoded form. Anything else gets `403` and
//! never reaches a handler.
//!
//! Must run inside [`SessionLayer`](super::SessionLayer):
//!
//! ```rust,no_run
//! use axum::Router;
//! use taxi_service::middleware::{CsrfLayer, SessionLayer};
//! use taxi_service::state::AppState;
//!
//! # fn example(state: AppState) -> Router<AppState> {
//! Router::new()
//!     .layer(CsrfLayer::new(64 * 1024))
//!     .layer(SessionLayer::new(&state))
//! # }
//! ```

use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::auth::Session;
use crate::error::TaxiError;

/// Header carrying the token on HTMX requests
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Hidden form field carrying the token
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Layer installing [`CsrfMiddleware`]
#[derive(Debug, Clone, Copy)]
pub struct CsrfLayer {
    max_body_bytes: usize,
}

impl CsrfLayer {
    /// Layer buffering at most `max_body_bytes` of a form body to find the
    /// token
    #[must_use]
    pub const fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfMiddleware {
            inner,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Middleware rejecting unsafe requests without the session's CSRF token
#[derive(Debug, Clone)]
pub struct CsrfMiddleware<S> {
    inner: S,
    max_body_bytes: usize,
}

impl<S> Service<Request> for CsrfMiddleware<S>
where
    S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if is_method_safe(req.method()) {
            return Box::pin(inner.call(req));
        }

        let max_body_bytes = self.max_body_bytes;
        Box::pin(async move {
            let Some(session) = req.extensions().get::<Session>().cloned() else {
                return Ok(
                    TaxiError::ServerError("session layer is not installed".to_string())
                        .into_response(),
                );
            };

            let method = req.method().clone();
            let path = req.uri().path().to_string();

            let (req, token) = match extract_token(req, max_body_bytes).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!(error = %e, %path, "unreadable form body");
                    return Ok(StatusCode::PAYLOAD_TOO_LARGE.into_response());
                }
            };

            if !token.is_some_and(|token| session.verify_csrf(&token)) {
                tracing::warn!(%method, %path, "CSRF token missing or incorrect");
                return Ok(
                    TaxiError::Forbidden("CSRF token missing or incorrect".to_string())
                        .into_response(),
                );
            }

            inner.call(req).await
        })
    }
}

const fn is_method_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Token from the header, or from the form body which is put back for the
/// handler
async fn extract_token(
    req: Request,
    max_body_bytes: usize,
) -> Result<(Request, Option<String>), axum::Error> {
    if let Some(value) = req.headers().get(CSRF_HEADER_NAME) {
        let token = value.to_str().ok().map(ToString::to_string);
        return Ok((req, token));
    }

    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Ok((req, None));
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, max_body_bytes).await?;
    let token = form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}
