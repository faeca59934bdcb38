//! Driver account forms: sign-up and license update

use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use super::builder::FormBuilder;
use super::error::{FormError, ValidationErrors};
use super::field::InputType;
use super::rules::{
    password_problems, validate_license_number, validate_required, validate_username,
};
use crate::models::{unique_violation_field, Driver, NewDriver};

pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub(crate) const LICENSE_TAKEN: &str = "Driver with this License number already exists.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Form errors for a username or license number another request took
/// between `clean` and the write
///
/// # Errors
///
/// Returns `error` unchanged unless it is a unique violation
pub fn driver_taken_errors(error: sqlx::Error) -> Result<ValidationErrors, sqlx::Error> {
    let field = unique_violation_field(&error).map(ToString::to_string);
    let mut errors = ValidationErrors::new();
    match field.as_deref() {
        Some("license_number") => {
            errors.add_with_code("license_number", LICENSE_TAKEN, "unique");
        }
        Some(_) => errors.add_with_code("username", USERNAME_TAKEN, "unique"),
        None => return Err(error),
    }
    Ok(errors)
}

/// New driver account with a license number
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DriverCreationForm {
    /// Login name
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Password
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub password1: String,

    /// Password confirmation
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub password2: String,

    /// Given name
    #[serde(default)]
    #[validate(
        custom(function = "validate_required"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub first_name: String,

    /// Family name
    #[serde(default)]
    #[validate(
        custom(function = "validate_required"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub last_name: String,

    /// License number
    #[serde(default)]
    #[validate(custom(function = "validate_license_number"))]
    pub license_number: String,
}

impl DriverCreationForm {
    fn trim(&mut self) {
        for value in [
            &mut self.username,
            &mut self.first_name,
            &mut self.last_name,
            &mut self.license_number,
        ] {
            *value = value.trim().to_string();
        }
    }

    /// Validate and check uniqueness, producing the account to insert
    ///
    /// Password rules (matching, length, not numeric, not the username) are
    /// reported on `password2`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] with every field problem, or
    /// [`FormError::Database`] if a lookup fails
    pub async fn clean(&mut self, pool: &SqlitePool) -> Result<NewDriver, FormError> {
        self.trim();
        let mut errors = ValidationErrors::of(&*self);

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 == self.password2 {
                for problem in password_problems(&self.password2, &self.username) {
                    errors.add_with_code("password2", problem, "password_invalid");
                }
            } else {
                errors.add_with_code("password2", PASSWORD_MISMATCH, "password_mismatch");
            }
        }

        if !errors.has_field_error("username")
            && Driver::find_by_username(pool, &self.username).await?.is_some()
        {
            errors.add_with_code("username", USERNAME_TAKEN, "unique");
        }

        if !errors.has_field_error("license_number")
            && Driver::license_taken(pool, &self.license_number, None).await?
        {
            errors.add_with_code("license_number", LICENSE_TAKEN, "unique");
        }

        errors.into_result()?;

        Ok(NewDriver {
            username: self.username.clone(),
            password: self.password1.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            license_number: Some(self.license_number.clone()),
            ..NewDriver::default()
        })
    }

    /// Render the sign-up form
    #[must_use]
    pub fn render(&self, action: &str, csrf_token: &str, errors: &ValidationErrors) -> String {
        FormBuilder::new(action, "post")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("username", InputType::Text)
            .label("Username")
            .value(&self.username)
            .required()
            .autofocus()
            .max_length(150)
            .autocomplete("username")
            .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
            .done()
            .field("password1", InputType::Password)
            .label("Password")
            .required()
            .autocomplete("new-password")
            .help("Your password must contain at least 8 characters and can't be entirely numeric.")
            .done()
            .field("password2", InputType::Password)
            .label("Password confirmation")
            .required()
            .autocomplete("new-password")
            .help("Enter the same password as before, for verification.")
            .done()
            .field("first_name", InputType::Text)
            .label("First name")
            .value(&self.first_name)
            .required()
            .max_length(150)
            .done()
            .field("last_name", InputType::Text)
            .label("Last name")
            .value(&self.last_name)
            .required()
            .max_length(150)
            .done()
            .field("license_number", InputType::Text)
            .label("License number")
            .value(&self.license_number)
            .required()
            .max_length(8)
            .placeholder("ABC12345")
            .done()
            .submit("Submit")
            .build()
    }
}

/// Replace a driver's license number
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DriverLicenseUpdateForm {
    /// New license number
    #[serde(default)]
    #[validate(custom(function = "validate_license_number"))]
    pub license_number: String,
}

impl DriverLicenseUpdateForm {
    /// Pre-filled from the driver's current license
    #[must_use]
    pub fn for_driver(driver: &Driver) -> Self {
        Self {
            license_number: driver.license().to_string(),
        }
    }

    /// Validate the format and check no other driver holds the number
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] or [`FormError::Database`]
    pub async fn clean(&mut self, pool: &SqlitePool, driver_id: i64) -> Result<String, FormError> {
        self.license_number = self.license_number.trim().to_string();
        let mut errors = ValidationErrors::of(&*self);

        if !errors.has_errors()
            && Driver::license_taken(pool, &self.license_number, Some(driver_id)).await?
        {
            errors.add_with_code("license_number", LICENSE_TAKEN, "unique");
        }

        errors.into_result()?;
        Ok(self.license_number.clone())
    }

    /// Render the license form
    #[must_use]
    pub fn render(&self, action: &str, csrf_token: &str, errors: &ValidationErrors) -> String {
        FormBuilder::new(action, "post")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("license_number", InputType::Text)
            .label("License number")
            .value(&self.license_number)
            .required()
            .autofocus()
            .max_length(8)
            .done()
            .submit("Update")
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHashConfig, PasswordHasher};
    use crate::db;
    use crate::error::TaxiError;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1024,
            iterations: 1,
            ..PasswordHashConfig::default()
        })
    }

    fn valid_form() -> DriverCreationForm {
        DriverCreationForm {
            username: "new_user".into(),
            password1: "user12test".into(),
            password2: "user12test".into(),
            first_name: "Test first".into(),
            last_name: "Test last".into(),
            license_number: "ABC12345".into(),
        }
    }

    fn invalid(result: Result<NewDriver, FormError>) -> ValidationErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_creation_form_with_license_first_last_name_is_valid() {
        let pool = db::memory_pool().await.unwrap();
        let new = valid_form().clean(&pool).await.unwrap();

        assert_eq!(new.username, "new_user");
        assert_eq!(new.password, "user12test");
        assert_eq!(new.first_name, "Test first");
        assert_eq!(new.last_name, "Test last");
        assert_eq!(new.license_number.as_deref(), Some("ABC12345"));
        assert!(!new.is_staff);
    }

    #[tokio::test]
    async fn test_creation_form_required_fields() {
        let pool = db::memory_pool().await.unwrap();
        let errors = invalid(DriverCreationForm::default().clean(&pool).await);

        for field in ["username", "password1", "password2", "first_name", "last_name"] {
            assert_eq!(errors.for_field(field)[0].message, "This field is required.", "{field}");
        }
        assert!(errors.has_field_error("license_number"));
    }

    #[tokio::test]
    async fn test_creation_form_password_rules() {
        let pool = db::memory_pool().await.unwrap();

        let mut mismatch = valid_form();
        mismatch.password2 = "other12test".into();
        let errors = invalid(mismatch.clean(&pool).await);
        assert_eq!(errors.for_field("password2")[0].message, PASSWORD_MISMATCH);

        let mut numeric = valid_form();
        numeric.password1 = "12345678".into();
        numeric.password2 = "12345678".into();
        let errors = invalid(numeric.clean(&pool).await);
        assert_eq!(errors.for_field("password2")[0].message, "This password is entirely numeric.");
    }

    #[tokio::test]
    async fn test_creation_form_bad_license() {
        let pool = db::memory_pool().await.unwrap();
        let mut form = valid_form();
        form.license_number = "abc12345".into();

        let errors = invalid(form.clean(&pool).await);
        assert_eq!(errors.count(), 1);
        assert_eq!(
            errors.for_field("license_number")[0].message,
            "First 3 characters should be uppercase letters"
        );
    }

    #[tokio::test]
    async fn test_creation_form_uniqueness() {
        let pool = db::memory_pool().await.unwrap();
        let new = valid_form().clean(&pool).await.unwrap();
        Driver::create(&pool, &hasher(), &new).await.unwrap();

        let errors = invalid(valid_form().clean(&pool).await);
        assert_eq!(errors.for_field("username")[0].message, USERNAME_TAKEN);
        assert_eq!(errors.for_field("license_number")[0].message, LICENSE_TAKEN);
    }

    #[tokio::test]
    async fn test_creation_form_trims_text() {
        let pool = db::memory_pool().await.unwrap();
        let mut form = valid_form();
        form.license_number = " ABC12345 ".into();

        let new = form.clean(&pool).await.unwrap();
        assert_eq!(new.license_number.as_deref(), Some("ABC12345"));
    }

    #[tokio::test]
    async fn test_license_update_form() {
        let pool = db::memory_pool().await.unwrap();
        let mut form = DriverLicenseUpdateForm {
            license_number: "CBA54321".into(),
        };
        assert_eq!(form.clean(&pool, 1).await.unwrap(), "CBA54321");
    }

    #[tokio::test]
    async fn test_license_update_keeps_own_number() {
        let pool = db::memory_pool().await.unwrap();
        let new = valid_form().clean(&pool).await.unwrap();
        let driver = Driver::create(&pool, &hasher(), &new).await.unwrap();

        let mut same = DriverLicenseUpdateForm::for_driver(&driver);
        assert!(same.clean(&pool, driver.id).await.is_ok());

        let mut taken = DriverLicenseUpdateForm::for_driver(&driver);
        assert!(matches!(
            taken.clean(&pool, driver.id + 1).await,
            Err(FormError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_write_race_becomes_field_error() {
        let pool = db::memory_pool().await.unwrap();
        let new = valid_form().clean(&pool).await.unwrap();
        Driver::create(&pool, &hasher(), &new).await.unwrap();

        let Err(TaxiError::Database(e)) = Driver::create(&pool, &hasher(), &new).await else {
            panic!("second insert must collide");
        };
        let errors = driver_taken_errors(e).unwrap();
        assert!(errors.has_field_error("username"));
        assert!(!errors.has_field_error("license_number"));

        let rival = Driver::create(
            &pool,
            &hasher(),
            &NewDriver {
                username: "rival".into(),
                license_number: Some("XYZ54321".into()),
                ..new.clone()
            },
        )
        .await
        .unwrap();
        let e = Driver::update_license(&pool, rival.id, "ABC12345")
            .await
            .unwrap_err();
        let errors = driver_taken_errors(e).unwrap();
        assert!(errors.has_field_error("license_number"));

        assert!(driver_taken_errors(sqlx::Error::RowNotFound).is_err());
    }

    #[test]
    fn test_creation_render_has_all_inputs() {
        let html = valid_form().render("/drivers/create/", "token", &ValidationErrors::new());
        for name in [
            "username",
            "password1",
            "password2",
            "first_name",
            "last_name",
            "license_number",
        ] {
            assert!(html.contains(&format!(r#"name="{name}""#)), "{name}");
        }
        assert!(!html.contains("user12test"));
    }
}
