//! Login form

use serde::Deserialize;
use validator::Validate;

use super::builder::FormBuilder;
use super::error::ValidationErrors;
use super::field::InputType;
use super::rules::validate_required;

/// Message shown when the credentials do not match an active account
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Username, password and the page to return to
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    /// Login name
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub username: String,

    /// Password
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub password: String,

    /// Where to go after logging in
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    /// Empty form that returns to `next`
    #[must_use]
    pub fn with_next(next: Option<String>) -> Self {
        Self {
            next: next.unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Field errors, empty when both fields are filled in
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        ValidationErrors::of(self)
    }

    /// `next` when it is a path on this site, otherwise `/`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use taxi_service::forms::LoginForm;
    ///
    /// let form = LoginForm::with_next(Some("//evil.example/".into()));
    /// assert_eq!(form.redirect_target(), "/");
    /// ```
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        let next = self.next.as_str();
        let local = next.starts_with('/')
            && !next.starts_with("//")
            && !next.contains('\\')
            && !next.chars().any(char::is_control);
        if local {
            next
        } else {
            "/"
        }
    }

    /// Render the form; the password is never echoed back
    #[must_use]
    pub fn render(&self, action: &str, csrf_token: &str, errors: &ValidationErrors) -> String {
        FormBuilder::new(action, "post")
            .class("login-form")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("username", InputType::Text)
            .label("Username")
            .value(&self.username)
            .required()
            .autofocus()
            .autocomplete("username")
            .max_length(150)
            .done()
            .field("password", InputType::Password)
            .label("Password")
            .required()
            .autocomplete("current-password")
            .done()
            .hidden("next", &self.next)
            .submit("Log in")
            .build()
    }
}
