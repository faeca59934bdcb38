//! Manufacturer create/update form

use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use super::builder::FormBuilder;
use super::error::{FormError, ValidationErrors};
use super::field::InputType;
use super::rules::validate_required;
use crate::models::Manufacturer;

/// Name and country of a manufacturer
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ManufacturerForm {
    /// Unique name
    #[serde(default)]
    #[validate(
        custom(function = "validate_required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub name: String,

    /// Country
    #[serde(default)]
    #[validate(
        custom(function = "validate_required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub country: String,
}

impl ManufacturerForm {
    /// Pre-filled from an existing manufacturer
    #[must_use]
    pub fn for_manufacturer(manufacturer: &Manufacturer) -> Self {
        Self {
            name: manufacturer.name.clone(),
            country: manufacturer.country.clone(),
        }
    }

    /// Trim, validate, and check the name is free (ignoring `except_id`)
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] or [`FormError::Database`]
    pub async fn clean(
        &mut self,
        pool: &SqlitePool,
        except_id: Option<i64>,
    ) -> Result<(), FormError> {
        self.name = self.name.trim().to_string();
        self.country = self.country.trim().to_string();

        let mut errors = ValidationErrors::of(&*self);
        if !errors.has_field_error("name") {
            let existing = Manufacturer::find_by_name(pool, &self.name).await?;
            if existing.is_some_and(|m| Some(m.id) != except_id) {
                errors.add_with_code(
                    "name",
                    "Manufacturer with this Name already exists.",
                    "unique",
                );
            }
        }

        Ok(errors.into_result()?)
    }

    /// Render the form
    #[must_use]
    pub fn render(&self, action: &str, csrf_token: &str, errors: &ValidationErrors) -> String {
        FormBuilder::new(action, "post")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("name", InputType::Text)
            .label("Name")
            .value(&self.name)
            .required()
            .autofocus()
            .max_length(255)
            .done()
            .field("country", InputType::Text)
            .label("Country")
            .value(&self.country)
            .required()
            .max_length(255)
            .done()
            .submit("Submit")
            .build()
    }
}
