//! Search forms for the list pages
//!
//! Each form has one optional text field read from the query string. An empty
//! value is valid and means "no filter"; more than 255 characters is invalid,
//! in which case the list is shown unfiltered with the error next to the box.

use serde::Deserialize;
use validator::Validate;

use super::builder::FormBuilder;
use super::error::ValidationErrors;
use super::field::InputType;

/// Shared behavior of the three list filters
pub trait SearchForm: Validate {
    /// Query parameter name
    const FIELD: &'static str;

    /// Placeholder shown in the empty box
    const PLACEHOLDER: &'static str;

    /// Raw submitted value
    fn value(&self) -> &str;

    /// Validation errors, empty when valid
    fn errors(&self) -> ValidationErrors {
        ValidationErrors::of(self)
    }

    /// Term to filter by, `None` when empty or invalid
    fn term(&self) -> Option<&str> {
        let term = self.value().trim();
        if term.is_empty() || self.validate().is_err() {
            None
        } else {
            Some(term)
        }
    }

    /// Render the search box submitting to `action`, live-updating `target`
    fn render(&self, action: &str, target: &str) -> String {
        let errors = self.errors();
        FormBuilder::new(action, "get")
            .class("search-form")
            .htmx_live_search(action, target, "input changed delay:300ms, submit")
            .errors(&errors)
            .field(Self::FIELD, InputType::Search)
            .placeholder(Self::PLACEHOLDER)
            .value(self.value())
            .done()
            .submit("Search")
            .build()
    }
}

/// Filter manufacturers by name
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ManufacturerSearchForm {
    /// Name substring
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: String,
}

impl SearchForm for ManufacturerSearchForm {
    const FIELD: &'static str = "name";
    const PLACEHOLDER: &'static str = "Search by name";

    fn value(&self) -> &str {
        &self.name
    }
}

/// Filter drivers by username
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DriverSearchForm {
    /// Username substring
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub username: String,
}

impl SearchForm for DriverSearchForm {
    const FIELD: &'static str = "username";
    const PLACEHOLDER: &'static str = "Search by username";

    fn value(&self) -> &str {
        &self.username
    }
}

/// Filter cars by model
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CarSearchForm {
    /// Model substring
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub model: String,
}

impl SearchForm for CarSearchForm {
    const FIELD: &'static str = "model";
    const PLACEHOLDER: &'static str = "Search by model";

    fn value(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOO_LONG: &str = "Ensure this value has at most 255 characters.";

    #[test]
    fn test_manufacturer_search_form() {
        let valid = ManufacturerSearchForm { name: "Test".into() };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.term(), Some("Test"));

        let empty = ManufacturerSearchForm { name: String::new() };
        assert!(empty.validate().is_ok());
        assert_eq!(empty.term(), None);

        let too_long = ManufacturerSearchForm { name: "n".repeat(256) };
        assert!(too_long.validate().is_err());
        assert_eq!(too_long.term(), None);
    }

    #[test]
    fn test_driver_search_form() {
        assert!(DriverSearchForm { username: "new_user".into() }.validate().is_ok());
        assert!(DriverSearchForm { username: String::new() }.validate().is_ok());
        assert!(DriverSearchForm { username: "n".repeat(256) }.validate().is_err());
    }

    #[test]
    fn test_car_search_form() {
        assert!(CarSearchForm { model: "Test".into() }.validate().is_ok());
        assert!(CarSearchForm { model: String::new() }.validate().is_ok());
        assert!(CarSearchForm { model: "n".repeat(256) }.validate().is_err());
        assert!(CarSearchForm { model: "n".repeat(255) }.validate().is_ok());
    }

    #[test]
    fn test_blank_term_is_no_filter() {
        assert_eq!(CarSearchForm { model: "   ".into() }.term(), None);
        assert_eq!(CarSearchForm { model: " Rio ".into() }.term(), Some("Rio"));
    }

    #[test]
    fn test_render_keeps_value_and_error() {
        let form = CarSearchForm { model: "n".repeat(256) };
        let html = form.render("/cars/", "#car-list");

        assert!(html.contains(r#"name="model""#));
        assert!(html.contains(TOO_LONG));
        assert!(html.contains(r#"hx-get="/cars/""#));
    }
}
