//! Session types and the per-request session handle

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cookie value is not a session id
    #[error("Invalid session ID format")]
    InvalidSessionId,

    /// Session value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session storage failed
    #[error("Session storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Unique session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Session ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(|_| Self(s.to_string()))
            .map_err(|_| SessionError::InvalidSessionId)
    }
}

/// Data stored per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// When this session was created
    pub created_at: DateTime<Utc>,
    /// When this session expires
    pub expires_at: DateTime<Utc>,
    /// Logged-in driver, if any
    pub user_id: Option<i64>,
    /// Arbitrary key-value data
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    /// Flash messages queued for the next rendered page
    #[serde(default)]
    pub flash_messages: Vec<FlashMessage>,
    /// Token every state-changing request must echo back
    #[serde(default)]
    pub csrf_token: Option<String>,
}

impl SessionData {
    /// Session data that expires after `ttl`
    #[must_use]
    pub fn with_expiration(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            expires_at: now + ttl,
            user_id: None,
            data: HashMap::new(),
            flash_messages: Vec::new(),
            csrf_token: None,
        }
    }

    /// Check if the session is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Read a typed value
    #[must_use]
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Store a value
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized to JSON
    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), SessionError> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Clear user, data, flashes and the CSRF token (keeps timestamps)
    pub fn clear(&mut self) {
        self.data.clear();
        self.flash_messages.clear();
        self.user_id = None;
        self.csrf_token = None;
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::with_expiration(Duration::weeks(2))
    }
}

/// Flash message for one-time display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    /// Message level
    pub level: FlashLevel,
    /// Message text
    pub message: String,
}

impl FlashMessage {
    /// Success message
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// Informational message
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    /// Error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// CSS class for this message
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        }
    }
}

/// Flash message severity level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Success message
    Success,
    /// Informational message
    Info,
    /// Error message
    Error,
}

#[derive(Debug)]
struct SessionState {
    id: SessionId,
    data: SessionData,
    persisted: bool,
    modified: bool,
    stale_id: Option<SessionId>,
}

/// Handle to the current request's session
///
/// The session middleware inserts one handle per request into the request
/// extensions. Clones share state, so changes made by a handler are seen by
/// the middleware when it decides whether to persist the session.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    /// Wrap a session loaded from storage
    #[must_use]
    pub fn existing(id: SessionId, data: SessionData) -> Self {
        Self::build(id, data, true)
    }

    /// Start a session that has not been stored yet
    #[must_use]
    pub fn fresh(data: SessionData) -> Self {
        Self::build(SessionId::generate(), data, false)
    }

    fn build(id: SessionId, data: SessionData, persisted: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                id,
                data,
                persisted,
                modified: false,
                stale_id: None,
            })),
        }
    }

    /// Current session ID
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.state.lock().id.clone()
    }

    /// Logged-in driver ID, if any
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.state.lock().data.user_id
    }

    /// Read a typed value
    #[must_use]
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.state.lock().data.get(key)
    }

    /// Store a value
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized to JSON
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        state.data.set(key, value)?;
        state.modified = true;
        Ok(())
    }

    /// Attach a driver to the session and issue a new session ID and CSRF
    /// token
    pub fn login(&self, user_id: i64) {
        let mut state = self.state.lock();
        state.data.user_id = Some(user_id);
        state.data.csrf_token = None;
        Self::cycle(&mut state);
    }

    /// Drop all session contents and issue a new session ID
    pub fn flush(&self) {
        let mut state = self.state.lock();
        state.data.clear();
        Self::cycle(&mut state);
    }

    fn cycle(state: &mut SessionState) {
        let old = std::mem::replace(&mut state.id, SessionId::generate());
        if state.persisted && state.stale_id.is_none() {
            state.stale_id = Some(old);
        }
        state.modified = true;
    }

    /// CSRF token for forms rendered in this session, created on first use
    #[must_use]
    pub fn csrf_token(&self) -> String {
        let mut state = self.state.lock();
        if let Some(token) = &state.data.csrf_token {
            return token.clone();
        }
        let token = Uuid::new_v4().simple().to_string();
        state.data.csrf_token = Some(token.clone());
        state.modified = true;
        token
    }

    /// Whether `candidate` is this session's CSRF token
    ///
    /// A session that never issued a token matches nothing.
    #[must_use]
    pub fn verify_csrf(&self, candidate: &str) -> bool {
        self.state
            .lock()
            .data
            .csrf_token
            .as_deref()
            .is_some_and(|token| constant_time_eq(token.as_bytes(), candidate.as_bytes()))
    }

    /// Queue a flash message
    pub fn add_flash(&self, message: FlashMessage) {
        let mut state = self.state.lock();
        state.data.flash_messages.push(message);
        state.modified = true;
    }

    /// Take all queued flash messages
    #[must_use]
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        let mut state = self.state.lock();
        if state.data.flash_messages.is_empty() {
            return Vec::new();
        }
        state.modified = true;
        std::mem::take(&mut state.data.flash_messages)
    }

    /// Whether the session must be written back
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.state.lock().modified
    }

    /// Whether the client needs a new cookie once the session is saved
    #[must_use]
    pub fn needs_cookie(&self) -> bool {
        let state = self.state.lock();
        !state.persisted || state.stale_id.is_some()
    }

    /// ID replaced by [`Session::login`] or [`Session::flush`], to be
    /// removed from storage
    #[must_use]
    pub fn stale_id(&self) -> Option<SessionId> {
        self.state.lock().stale_id.clone()
    }

    /// Copy of the current ID and data for persisting
    #[must_use]
    pub fn snapshot(&self) -> (SessionId, SessionData) {
        let state = self.state.lock();
        (state.id.clone(), state.data.clone())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::generate();
        assert_eq!(SessionId::from_str(id.as_str()).unwrap(), id);
        assert!(SessionId::from_str("../../etc/passwd").is_err());
    }

    #[test]
    fn test_session_data_expiry() {
        assert!(!SessionData::default().is_expired());
        assert!(SessionData::with_expiration(Duration::seconds(-1)).is_expired());
    }

    #[test]
    fn test_set_marks_modified() {
        let session = Session::fresh(SessionData::default());
        assert!(!session.is_modified());

        session.set("num_visits", 3_u32).unwrap();
        assert!(session.is_modified());
        assert_eq!(session.get::<u32>("num_visits"), Some(3));
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::fresh(SessionData::default());
        let handle = session.clone();
        handle.add_flash(FlashMessage::success("Car created"));

        assert_eq!(session.take_flashes(), vec![FlashMessage::success("Car created")]);
        assert!(handle.take_flashes().is_empty());
    }

    #[test]
    fn test_login_rotates_persisted_id() {
        let original = SessionId::generate();
        let session = Session::existing(original.clone(), SessionData::default());
        assert!(!session.needs_cookie());

        session.login(42);

        assert_eq!(session.user_id(), Some(42));
        assert_ne!(session.id(), original);
        assert_eq!(session.stale_id(), Some(original));
        assert!(session.needs_cookie());
    }

    #[test]
    fn test_flush_clears_user() {
        let session = Session::fresh(SessionData::default());
        session.login(7);
        session.flush();

        assert_eq!(session.user_id(), None);
        assert_eq!(session.stale_id(), None);
        assert!(session.is_modified());
    }

    #[test]
    fn test_csrf_token_is_stable_until_login() {
        let session = Session::fresh(SessionData::default());
        assert!(!session.verify_csrf(""));

        let token = session.csrf_token();
        assert_eq!(token.len(), 32);
        assert!(session.is_modified());
        assert_eq!(session.csrf_token(), token);
        assert!(session.verify_csrf(&token));
        assert!(!session.verify_csrf("0123456789abcdef0123456789abcdef"));

        session.login(3);
        assert!(!session.verify_csrf(&token));
        assert_ne!(session.csrf_token(), token);
    }

    #[test]
    fn test_flush_drops_csrf_token() {
        let session = Session::fresh(SessionData::default());
        let token = session.csrf_token();
        session.flush();
        assert!(!session.verify_csrf(&token));
    }

    #[test]
    fn test_flash_css_class() {
        assert_eq!(FlashMessage::error("nope").css_class(), "flash-error");
        assert_eq!(FlashMessage::info("fyi").css_class(), "flash-info");
    }
}
