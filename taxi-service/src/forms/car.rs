//! Car create/update form with a driver checkbox group

use sqlx::SqlitePool;
use validator::Validate;

use super::builder::FormBuilder;
use super::error::{FormError, ValidationErrors};
use super::extract::FormData;
use super::field::InputType;
use super::rules::{validate_required, REQUIRED};
use crate::models::{Car, CarInput, Driver, Manufacturer};

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Model, manufacturer and assigned drivers as submitted
///
/// Built from [`FormData`] since `drivers` repeats once per checked box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CarForm {
    /// Model name
    #[validate(
        custom(function = "validate_required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub model: String,

    /// Manufacturer ID as submitted
    pub manufacturer: String,

    /// Driver IDs as submitted
    pub drivers: Vec<String>,
}

impl CarForm {
    /// Read the submitted fields
    #[must_use]
    pub fn from_data(data: &FormData) -> Self {
        Self {
            model: data.text("model"),
            manufacturer: data.text("manufacturer"),
            drivers: data
                .get_all("drivers")
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Pre-filled from an existing car and its drivers
    #[must_use]
    pub fn for_car(car: &Car, driver_ids: &[i64]) -> Self {
        Self {
            model: car.model.clone(),
            manufacturer: car.manufacturer_id.to_string(),
            drivers: driver_ids.iter().map(ToString::to_string).collect(),
        }
    }

    /// Validate against the stored manufacturers and drivers
    ///
    /// Duplicate driver IDs are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] or [`FormError::Database`]
    pub async fn clean(&mut self, pool: &SqlitePool) -> Result<CarInput, FormError> {
        self.model = self.model.trim().to_string();
        let mut errors = ValidationErrors::of(&*self);

        let manufacturer_id = if self.manufacturer.is_empty() {
            errors.add_with_code("manufacturer", REQUIRED, "required");
            None
        } else {
            let found = match self.manufacturer.parse::<i64>() {
                Ok(id) => Manufacturer::find_by_id(pool, id).await?.map(|m| m.id),
                Err(_) => None,
            };
            if found.is_none() {
                errors.add_with_code("manufacturer", INVALID_CHOICE, "invalid_choice");
            }
            found
        };

        let mut driver_ids = Vec::with_capacity(self.drivers.len());
        for raw in &self.drivers {
            let known = match raw.parse::<i64>() {
                Ok(id) => Driver::find_by_id(pool, id).await?.map(|d| d.id),
                Err(_) => None,
            };
            match known {
                Some(id) if !driver_ids.contains(&id) => driver_ids.push(id),
                Some(_) => {}
                None => errors.add_with_code(
                    "drivers",
                    format!("Select a valid choice. {raw} is not one of the available choices."),
                    "invalid_choice",
                ),
            }
        }

        let (Some(manufacturer_id), false) = (manufacturer_id, errors.has_errors()) else {
            return Err(FormError::Invalid(errors));
        };

        Ok(CarInput {
            model: self.model.clone(),
            manufacturer_id,
            driver_ids,
        })
    }

    /// Render with the available manufacturers and drivers as choices
    #[must_use]
    pub fn render(
        &self,
        action: &str,
        csrf_token: &str,
        errors: &ValidationErrors,
        manufacturers: &[Manufacturer],
        drivers: &[Driver],
    ) -> String {
        let mut form = FormBuilder::new(action, "post")
            .errors(errors)
            .csrf_token(csrf_token)
            .field("model", InputType::Text)
            .label("Model")
            .value(&self.model)
            .required()
            .autofocus()
            .max_length(255)
            .done()
            .select("manufacturer")
            .label("Manufacturer")
            .required()
            .value(&self.manufacturer)
            .placeholder_option("---------");
        for manufacturer in manufacturers {
            form = form.option(manufacturer.id.to_string(), manufacturer.to_string());
        }

        let mut group = form.done().checkbox_group("drivers").label("Drivers");
        for driver in drivers {
            group = group.option(driver.id.to_string(), driver.to_string());
        }

        group
            .selected(self.drivers.iter().cloned())
            .done()
            .submit("Submit")
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHashConfig, PasswordHasher};
    use crate::db;
    use crate::models::NewDriver;

    async fn seed(pool: &SqlitePool) -> (Manufacturer, Driver) {
        let hasher = PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1024,
            iterations: 1,
            ..PasswordHashConfig::default()
        });
        let manufacturer = Manufacturer::create(pool, "test", "test").await.unwrap();
        let driver = Driver::create(
            pool,
            &hasher,
            &NewDriver {
                username: "test1".into(),
                password: "test123".into(),
                first_name: "first".into(),
                last_name: "last".into(),
                license_number: Some("ABC12345".into()),
                ..NewDriver::default()
            },
        )
        .await
        .unwrap();
        (manufacturer, driver)
    }

    #[tokio::test]
    async fn test_car_form_is_valid() {
        let pool = db::memory_pool().await.unwrap();
        let (manufacturer, driver) = seed(&pool).await;

        let body = format!("model=Test&manufacturer={}&drivers={}", manufacturer.id, driver.id);
        let mut form = CarForm::from_data(&FormData::parse(body.as_bytes()));
        let input = form.clean(&pool).await.unwrap();

        assert_eq!(input.model, "Test");
        assert_eq!(input.manufacturer_id, manufacturer.id);
        assert_eq!(input.driver_ids, vec![driver.id]);
    }

    #[tokio::test]
    async fn test_no_drivers_and_duplicates() {
        let pool = db::memory_pool().await.unwrap();
        let (manufacturer, driver) = seed(&pool).await;

        let mut none = CarForm {
            model: "Solo".into(),
            manufacturer: manufacturer.id.to_string(),
            drivers: Vec::new(),
        };
        assert!(none.clean(&pool).await.unwrap().driver_ids.is_empty());

        let mut twice = CarForm {
            drivers: vec![driver.id.to_string(), driver.id.to_string()],
            ..none.clone()
        };
        assert_eq!(twice.clean(&pool).await.unwrap().driver_ids, vec![driver.id]);
    }

    #[tokio::test]
    async fn test_unknown_choices_rejected() {
        let pool = db::memory_pool().await.unwrap();
        seed(&pool).await;

        let mut form = CarForm {
            model: String::new(),
            manufacturer: "999".into(),
            drivers: vec!["abc".into(), "42".into()],
        };
        let Err(FormError::Invalid(errors)) = form.clean(&pool).await else {
            panic!("invalid car accepted");
        };

        assert_eq!(errors.for_field("model")[0].message, REQUIRED);
        assert_eq!(errors.for_field("manufacturer")[0].message, INVALID_CHOICE);
        assert_eq!(errors.for_field("drivers").len(), 2);
    }

    #[tokio::test]
    async fn test_drivers_render_as_checkboxes() {
        let pool = db::memory_pool().await.unwrap();
        let (manufacturer, driver) = seed(&pool).await;

        let form = CarForm {
            drivers: vec![driver.id.to_string()],
            ..CarForm::default()
        };
        let html = form.render(
            "/cars/create/",
            "token",
            &ValidationErrors::new(),
            &[manufacturer],
            &[driver],
        );

        assert!(html.contains(r#"class="checkbox-group""#));
        assert!(html.contains(r#"type="checkbox" name="drivers""#));
        assert!(html.contains("test1 (first last)"));
        assert!(html.contains(" checked"));
        assert!(html.contains("<option value=\"1\">test test</option>"));
    }
}
