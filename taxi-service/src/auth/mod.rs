//! Authentication and sessions
//!
//! Drivers log in with a username and password (Argon2id hashes). The
//! logged-in driver's ID lives in a server-side session stored in the
//! `sessions` table and referenced by a cookie.

pub mod extractors;
pub mod handlers;
pub mod password;
pub mod session;
pub mod store;

use http::uri::PathAndQuery;

pub use extractors::{Authenticated, AuthenticationError, StaffUser};
pub use password::{PasswordError, PasswordHashConfig, PasswordHasher};
pub use session::{FlashLevel, FlashMessage, Session, SessionData, SessionError, SessionId};
pub use store::SessionStore;

/// Login page URL that returns to `next` afterwards
///
/// # Examples
///
/// ```rust
/// use axum::http::uri::PathAndQuery;
/// use taxi_service::auth::login_url;
///
/// let next = PathAndQuery::from_static("/cars/?page=2");
/// assert_eq!(
///     login_url("/accounts/login/", Some(&next)),
///     "/accounts/login/?next=%2Fcars%2F%3Fpage%3D2"
/// );
/// ```
#[must_use]
pub fn login_url(login_path: &str, next: Option<&PathAndQuery>) -> String {
    match next {
        Some(next) => {
            let encoded: String =
                form_urlencoded::byte_serialize(next.as_str().as_bytes()).collect();
            format!("{login_path}?next={encoded}")
        }
        None => login_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_without_next() {
        assert_eq!(login_url("/accounts/login/", None), "/accounts/login/");
    }

    #[test]
    fn test_login_url_encodes_query() {
        let next = PathAndQuery::from_static("/drivers/?username=a&b");
        assert_eq!(
            login_url("/accounts/login/", Some(&next)),
            "/accounts/login/?next=%2Fdrivers%2F%3Fusername%3Da%26b"
        );
    }
}
