//! Field rules shared by the driver, car and manufacturer forms
//!
//! Each rule has the `validator` custom-function shape so it can be used in
//! `#[validate(custom(function = "..."))]` attributes.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Message for a missing value
pub const REQUIRED: &str = "This field is required.";

/// Length of a license number
pub const LICENSE_LENGTH: usize = 8;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length
pub const MAX_USERNAME_LENGTH: usize = 150;

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+\z").expect("Invalid regex"));

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Reject blank values
///
/// # Errors
///
/// Returns a `required` error when `value` is empty after trimming
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

/// Usernames: required, at most 150 characters of letters, digits and `@.+-_`
///
/// # Errors
///
/// Returns the first rule the value breaks
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;

    if value.chars().count() > MAX_USERNAME_LENGTH {
        return Err(invalid(
            "max_length",
            "Ensure this value has at most 150 characters.",
        ));
    }
    if !USERNAME_REGEX.is_match(value) {
        return Err(invalid(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, \
             and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// License numbers: 3 uppercase ASCII letters followed by 5 ASCII digits
///
/// The checks run in order and the first failure is reported.
///
/// # Errors
///
/// Returns a `license_length`, `license_letters` or `license_digits` error
///
/// # Examples
///
/// ```rust
/// use taxi_service::forms::validate_license_number;
///
/// assert!(validate_license_number("ABC12345").is_ok());
/// assert!(validate_license_number("abc12345").is_err());
/// ```
pub fn validate_license_number(value: &str) -> Result<(), ValidationError> {
    let chars: Vec<char> = value.chars().collect();

    if chars.len() != LICENSE_LENGTH {
        return Err(invalid(
            "license_length",
            "License number should consist of 8 characters",
        ));
    }
    if !chars[..3].iter().all(char::is_ascii_uppercase) {
        return Err(invalid(
            "license_letters",
            "First 3 characters should be uppercase letters",
        ));
    }
    if !chars[3..].iter().all(char::is_ascii_digit) {
        return Err(invalid("license_digits", "Last 5 characters should be digits"));
    }
    Ok(())
}

/// Every password rule `password` breaks, given the account's username
#[must_use]
pub fn password_problems(password: &str, username: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();

    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        problems.push("The password is too similar to the username.");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push("This password is too short. It must contain at least 8 characters.");
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.");
    }
    problems
}
