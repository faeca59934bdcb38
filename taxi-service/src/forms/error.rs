//! Form validation error types
//!
//! Collects per-field messages for re-rendering a form, and converts from the
//! `validator` crate's error tree.

use std::collections::BTreeMap;

/// Key under which errors that belong to no single field are stored
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A single validation error for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The error message
    pub message: String,
    /// Optional error code for programmatic handling
    pub code: Option<String>,
}

impl FieldError {
    /// Field error with just a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Field error with a message and code
    #[must_use]
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collection of validation errors keyed by field name
///
/// # Examples
///
/// ```rust
/// use taxi_service::forms::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("license_number", "License number should consist of 8 characters");
/// errors.add_non_field("Please enter a correct username and password.");
///
/// assert!(errors.has_errors());
/// assert_eq!(errors.for_field("license_number").len(), 1);
/// assert_eq!(errors.non_field().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Empty error collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported by a `validator` form, empty when it is valid
    #[must_use]
    pub fn of<T: validator::Validate + ?Sized>(form: &T) -> Self {
        form.validate().map_or_else(Self::from, |()| Self::new())
    }

    /// Add an error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(FieldError::new(message));
    }

    /// Add an error with a code for a field
    pub fn add_with_code(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(FieldError::with_code(message, code));
    }

    /// Add an error that belongs to the whole form
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// Whether any error was recorded
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether a specific field has errors
    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Errors for one field
    #[must_use]
    pub fn for_field(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Errors for the whole form
    #[must_use]
    pub fn non_field(&self) -> &[FieldError] {
        self.for_field(NON_FIELD_ERRORS)
    }

    /// Total number of errors
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Merge errors from another collection
    pub fn merge(&mut self, other: Self) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    ///
    /// Returns the collection itself when it holds any error
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }

    /// Iterate over all errors
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Why a submitted form could not be turned into model input
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The input broke one or more field rules; re-render with these errors
    #[error("form has {} error(s)", .0.count())]
    Invalid(ValidationErrors),

    /// A uniqueness or existence lookup failed
    #[error("form lookup failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                result.add_with_code(field.to_string(), message, error.code.to_string());
            }
        }
        result
    }
}
