//! Multi-value form body extractor
//!
//! `axum::Form` deserializes into a struct and loses repeated keys, which a
//! checkbox group produces (`drivers=1&drivers=4`). [`FormData`] keeps every
//! pair in submission order.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};

use crate::error::TaxiError;

/// Decoded `application/x-www-form-urlencoded` body
///
/// # Examples
///
/// ```rust
/// use taxi_service::forms::FormData;
///
/// let form = FormData::parse(b"model=Rio&drivers=1&drivers=4");
/// assert_eq!(form.text("model"), "Rio");
/// assert_eq!(form.get_all("drivers"), vec!["1", "4"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Decode a urlencoded body
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// Last value submitted for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted for `key`, in order
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Trimmed value for `key`, empty when missing
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(str::trim).unwrap_or_default().to_string()
    }

    /// Whether a checkbox named `key` was checked
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v, "on" | "true" | "1"))
    }

    /// Whether the body was empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = TaxiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| TaxiError::BadRequest(format!("Failed to read form body: {e}")))?;
        Ok(Self::parse(&bytes))
    }
}
