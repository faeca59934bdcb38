//! Session middleware
//!
//! Reads the session cookie, loads the session from [`SessionStore`] and
//! inserts a [`Session`] handle into the request extensions. After the
//! handler runs, a modified session is written back, a rotated-out ID is
//! deleted, and a `Set-Cookie` header is sent when the client needs a new ID.

use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::response::Response;
use chrono::{Duration, Utc};
use tower::{Layer, Service};

use crate::auth::{Session, SessionData, SessionId, SessionStore};
use crate::config::SessionSettings;
use crate::state::AppState;

/// Layer installing [`SessionMiddleware`]
#[derive(Debug, Clone)]
pub struct SessionLayer {
    settings: Arc<SessionSettings>,
    store: SessionStore,
}

impl SessionLayer {
    /// Layer using the state's session settings and pool
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self::with_store(state.config().session.clone(), state.sessions())
    }

    /// Layer with explicit settings and store
    #[must_use]
    pub fn with_store(settings: SessionSettings, store: SessionStore) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            settings: self.settings.clone(),
            store: self.store.clone(),
        }
    }
}

/// Cookie-based session middleware
#[derive(Debug, Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    settings: Arc<SessionSettings>,
    store: SessionStore,
}

impl<S> Service<Request> for SessionMiddleware<S>
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

    fn call(&mut self, mut req: Request) -> Self::Future {
        let settings = self.settings.clone();
        let store = self.store.clone();
        let clone = self.inner.clone();
        // Use the instance that was polled ready.
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let session_id = extract_session_id(&req, &settings.cookie_name);
            let session = load_session(session_id, &settings, &store).await;
            req.extensions_mut().insert(session.clone());

            let mut response = inner.call(req).await?;

            if let Some(stale) = session.stale_id() {
                if let Err(e) = store.delete(&stale).await {
                    tracing::warn!(error = %e, "failed to delete rotated session");
                }
            }

            if session.is_modified() {
                let (id, mut data) = session.snapshot();
                data.expires_at = Utc::now() + ttl(&settings);

                match store.save(&id, &data).await {
                    Ok(()) if session.needs_cookie() => {
                        set_session_cookie(&mut response, &id, &settings);
                    }
                    Ok(()) => {}
                    Err(e) => tracing::error!(error = %e, "failed to save session"),
                }
            }

            Ok(response)
        })
    }
}

async fn load_session(
    session_id: Option<SessionId>,
    settings: &SessionSettings,
    store: &SessionStore,
) -> Session {
    let Some(id) = session_id else {
        return Session::fresh(SessionData::with_expiration(ttl(settings)));
    };

    match store.load(&id).await {
        Ok(Some(data)) => Session::existing(id, data),
        Ok(None) => Session::fresh(SessionData::with_expiration(ttl(settings))),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load session, starting a new one");
            Session::fresh(SessionData::with_expiration(ttl(settings)))
        }
    }
}

fn ttl(settings: &SessionSettings) -> Duration {
    i64::try_from(settings.max_age_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| Duration::days(14))
}

/// Extract session ID from request cookies
fn extract_session_id(req: &Request, cookie_name: &str) -> Option<SessionId> {
    let cookie_header = req.headers().get(COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .and_then(|(_, value)| SessionId::from_str(value.trim()).ok())
}

/// Set session cookie on response
fn set_session_cookie(
    response: &mut Response<Body>,
    session_id: &SessionId,
    settings: &SessionSettings,
) {
    let mut cookie_value = format!(
        "{}={}; Path=/; Max-Age={}; SameSite={}; HttpOnly",
        settings.cookie_name,
        session_id.as_str(),
        settings.max_age_secs,
        settings.same_site.as_str()
    );

    if settings.secure {
        cookie_value.push_str("; Secure");
    }

    if let Ok(header_value) = cookie_value.parse() {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
}
