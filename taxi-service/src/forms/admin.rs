//! Admin console driver form
//!
//! Unlike the sign-up form, names and the license number may be left blank
//! (superusers created from the command line have none), and the staff and
//! active flags are editable. A license number that is filled in must still
//! follow the format.

use sqlx::SqlitePool;
use validator::{Validate, ValidationError};

use super::builder::FormBuilder;
use super::driver::{LICENSE_TAKEN, USERNAME_TAKEN};
use super::error::{FormError, ValidationErrors};
use super::extract::FormData;
use super::field::InputType;
use super::rules::{password_problems, validate_license_number, validate_username, REQUIRED};
use crate::models::{Driver, DriverChanges, NewDriver};

fn validate_optional_license(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_license_number(value)
}

/// Driver fields editable by staff
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct AdminDriverForm {
    /// Login name
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Password, only read when adding
    pub password1: String,

    /// Password confirmation, only read when adding
    pub password2: String,

    /// Given name
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    /// Family name
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,

    /// License number, blank for none
    #[validate(custom(function = "validate_optional_license"))]
    pub license_number: String,

    /// Staff status
    pub is_staff: bool,

    /// Superuser status
    pub is_superuser: bool,

    /// Active status
    pub is_active: bool,
}

impl AdminDriverForm {
    /// Blank add form
    #[must_use]
    pub fn blank() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    /// Read the submitted fields
    #[must_use]
    pub fn from_data(data: &FormData) -> Self {
        Self {
            username: data.text("username"),
            password1: data.get("password1").unwrap_or_default().to_string(),
            password2: data.get("password2").unwrap_or_default().to_string(),
            first_name: data.text("first_name"),
            last_name: data.text("last_name"),
            license_number: data.text("license_number"),
            is_staff: data.flag("is_staff"),
            is_superuser: data.flag("is_superuser"),
            is_active: data.flag("is_active"),
        }
    }

    /// Pre-filled from a stored driver
    #[must_use]
    pub fn for_driver(driver: &Driver) -> Self {
        Self {
            username: driver.username.clone(),
            password1: String::new(),
            password2: String::new(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            license_number: driver.license().to_string(),
            is_staff: driver.is_staff,
            is_superuser: driver.is_superuser,
            is_active: driver.is_active,
        }
    }

    fn license(&self) -> Option<String> {
        (!self.license_number.is_empty()).then(|| self.license_number.clone())
    }

    async fn check_unique(
        &self,
        pool: &SqlitePool,
        except_id: Option<i64>,
        errors: &mut ValidationErrors,
    ) -> Result<(), sqlx::Error> {
        if !errors.has_field_error("username") {
            let existing = Driver::find_by_username(pool, &self.username).await?;
            if existing.is_some_and(|d| Some(d.id) != except_id) {
                errors.add_with_code("username", USERNAME_TAKEN, "unique");
            }
        }

        if !self.license_number.is_empty()
            && !errors.has_field_error("license_number")
            && Driver::license_taken(pool, &self.license_number, except_id).await?
        {
            errors.add_with_code("license_number", LICENSE_TAKEN, "unique");
        }
        Ok(())
    }

    /// Validate a new account
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] or [`FormError::Database`]
    pub async fn clean_add(&mut self, pool: &SqlitePool) -> Result<NewDriver, FormError> {
        let mut errors = ValidationErrors::of(&*self);

        if self.password1.is_empty() {
            errors.add_with_code("password1", REQUIRED, "required");
        }
        if self.password2.is_empty() {
            errors.add_with_code("password2", REQUIRED, "required");
        } else if self.password1 != self.password2 {
            errors.add_with_code(
                "password2",
                "The two password fields didn't match.",
                "password_mismatch",
            );
        } else {
            for problem in password_problems(&self.password2, &self.username) {
                errors.add_with_code("password2", problem, "password_invalid");
            }
        }

        self.check_unique(pool, None, &mut errors).await?;
        errors.into_result()?;

        Ok(NewDriver {
            username: self.username.clone(),
            password: self.password1.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            license_number: self.license(),
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        })
    }

    /// Validate changes to driver `id`
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] or [`FormError::Database`]
    pub async fn clean_change(
        &mut self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<DriverChanges, FormError> {
        let mut errors = ValidationErrors::of(&*self);
        self.check_unique(pool, Some(id), &mut errors).await?;
        errors.into_result()?;

        Ok(DriverChanges {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            license_number: self.license(),
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
        })
    }

    /// Render the add form (with passwords) or the change form (with the
    /// active flag)
    #[must_use]
    pub fn render(
        &self,
        action: &str,
        csrf_token: &str,
        errors: &ValidationErrors,
        adding: bool,
    ) -> String {
        let mut form = FormBuilder::new(action, "post")
            .class("admin-form")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("username", InputType::Text)
            .label("Username")
            .value(&self.username)
            .required()
            .max_length(150)
            .done();

        if adding {
            form = form
                .field("password1", InputType::Password)
                .label("Password")
                .required()
                .autocomplete("new-password")
                .done()
                .field("password2", InputType::Password)
                .label("Password confirmation")
                .required()
                .autocomplete("new-password")
                .done();
        }

        form = form
            .field("first_name", InputType::Text)
            .label("First name")
            .value(&self.first_name)
            .max_length(150)
            .done()
            .field("last_name", InputType::Text)
            .label("Last name")
            .value(&self.last_name)
            .max_length(150)
            .done()
            .field("license_number", InputType::Text)
            .label("License number")
            .value(&self.license_number)
            .max_length(8)
            .done()
            .checkbox("is_staff")
            .label("Staff status")
            .checked(self.is_staff)
            .done()
            .checkbox("is_superuser")
            .label("Superuser status")
            .checked(self.is_superuser)
            .done();

        if !adding {
            form = form
                .checkbox("is_active")
                .label("Active")
                .checked(self.is_active)
                .done();
        }

        form.submit("Save").build()
    }
}
