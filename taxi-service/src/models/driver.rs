//! Drivers: user accounts carrying a license number

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::auth::PasswordHasher;
use crate::db::contains_pattern;
use crate::error::TaxiError;

const COLUMNS: &str = "id, username, password, first_name, last_name, license_number, \
                       is_staff, is_superuser, is_active, date_joined, last_login";

/// A driver account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Driver {
    /// Primary key
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC hash
    #[serde(skip_serializing)]
    pub password: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Driving license number, unique when present
    pub license_number: Option<String>,
    /// May use the admin console
    pub is_staff: bool,
    /// Has every permission
    pub is_superuser: bool,
    /// May log in
    pub is_active: bool,
    /// Account creation time
    pub date_joined: DateTime<Utc>,
    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.username, self.first_name, self.last_name)
    }
}

/// Data for a new driver account
#[derive(Debug, Clone, Default)]
pub struct NewDriver {
    /// Unique login name
    pub username: String,
    /// Plain-text password, hashed on insert
    pub password: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// License number
    pub license_number: Option<String>,
    /// Staff flag
    pub is_staff: bool,
    /// Superuser flag
    pub is_superuser: bool,
}

/// Fields editable from the admin console
#[derive(Debug, Clone)]
pub struct DriverChanges {
    /// Login name
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// License number
    pub license_number: Option<String>,
    /// Staff flag
    pub is_staff: bool,
    /// Superuser flag
    pub is_superuser: bool,
    /// Active flag
    pub is_active: bool,
}

impl Driver {
    /// Detail page path
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/drivers/{}/", self.id)
    }

    /// License number, or an empty string when unset
    #[must_use]
    pub fn license(&self) -> &str {
        self.license_number.as_deref().unwrap_or_default()
    }

    /// Insert a driver, hashing the password
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::Password`] if hashing fails or
    /// [`TaxiError::Database`] on write failure (including unique violations)
    pub async fn create(
        pool: &SqlitePool,
        hasher: &PasswordHasher,
        new: &NewDriver,
    ) -> Result<Self, TaxiError> {
        let password_hash = hasher.hash(&new.password)?;

        let driver = sqlx::query_as(&format!(
            "INSERT INTO drivers (username, password, first_name, last_name, license_number,
                                  is_staff, is_superuser, is_active, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?, TRUE, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.username)
        .bind(password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.license_number)
        .bind(new.is_staff)
        .bind(new.is_superuser)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(driver)
    }

    /// Find by primary key
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM drivers WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find by exact username
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM drivers WHERE username = ?"))
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Whether another driver already holds `license_number`
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn license_taken(
        pool: &SqlitePool,
        license_number: &str,
        except_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM drivers WHERE license_number = ? AND (? IS NULL OR id != ?)",
        )
        .bind(license_number)
        .bind(except_id)
        .bind(except_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Check credentials, returning the driver when they match an active
    /// account
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError`] on database or hash-format failure
    pub async fn authenticate(
        pool: &SqlitePool,
        hasher: &PasswordHasher,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>, TaxiError> {
        let Some(driver) = Self::find_by_username(pool, username).await? else {
            return Ok(None);
        };

        if !driver.is_active || !hasher.verify(password, &driver.password)? {
            return Ok(None);
        }

        Ok(Some(driver))
    }

    /// Check a plain-text password against this driver's hash
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::Password`] if the stored hash is malformed
    pub fn check_password(
        &self,
        hasher: &PasswordHasher,
        password: &str,
    ) -> Result<bool, TaxiError> {
        Ok(hasher.verify(password, &self.password)?)
    }

    /// Stamp `last_login` with the current time
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn record_login(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE drivers SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Replace the license number, returning `None` if the row is gone
    ///
    /// # Errors
    ///
    /// Returns a database error, including a unique violation
    pub async fn update_license(
        pool: &SqlitePool,
        id: i64,
        license_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE drivers SET license_number = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(license_number)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Apply admin console changes, returning `None` if the row is gone
    ///
    /// # Errors
    ///
    /// Returns a database error, including unique violations
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        changes: &DriverChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE drivers SET username = ?, first_name = ?, last_name = ?, license_number = ?,
                                is_staff = ?, is_superuser = ?, is_active = ?
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&changes.username)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.license_number)
        .bind(changes.is_staff)
        .bind(changes.is_superuser)
        .bind(changes.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a driver and their car assignments
    ///
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every driver, ordered by username
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM drivers ORDER BY username, id"))
            .fetch_all(pool)
            .await
    }

    /// Drivers assigned to a car, ordered by username
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn for_car(pool: &SqlitePool, car_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM drivers
             WHERE id IN (SELECT driver_id FROM car_drivers WHERE car_id = ?)
             ORDER BY username, id"
        ))
        .bind(car_id)
        .fetch_all(pool)
        .await
    }

    /// Number of drivers whose username contains `username` (all when `None`)
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn count(pool: &SqlitePool, username: Option<&str>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM drivers WHERE ? IS NULL OR username LIKE ? ESCAPE '\\'",
        )
        .bind(username)
        .bind(username.map(contains_pattern))
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One page of drivers whose username contains `username`
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn search(
        pool: &SqlitePool,
        username: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM drivers
             WHERE ? IS NULL OR username LIKE ? ESCAPE '\\'
             ORDER BY username, id LIMIT ? OFFSET ?"
        ))
        .bind(username)
        .bind(username.map(contains_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordHashConfig;
    use crate::db;
    use crate::models::unique_violation_field;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1024,
            iterations: 1,
            ..PasswordHashConfig::default()
        })
    }

    fn test1() -> NewDriver {
        NewDriver {
            username: "test1".to_string(),
            password: "test123".to_string(),
            first_name: "first".to_string(),
            last_name: "last".to_string(),
            license_number: Some("ABC12345".to_string()),
            ..NewDriver::default()
        }
    }

    #[tokio::test]
    async fn test_driver_display_and_url() {
        let pool = db::memory_pool().await.unwrap();
        let driver = Driver::create(&pool, &hasher(), &test1()).await.unwrap();

        assert_eq!(driver.to_string(), "test1 (first last)");
        assert_eq!(driver.absolute_url(), format!("/drivers/{}/", driver.id));
    }

    #[tokio::test]
    async fn test_driver_create_with_license_number() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        let driver = Driver::create(&pool, &hasher, &test1()).await.unwrap();

        assert_eq!(driver.username, "test1");
        assert!(driver.check_password(&hasher, "test123").unwrap());
        assert_eq!(driver.license(), "ABC12345");
        assert!(driver.is_active);
        assert!(!driver.is_staff);
    }

    #[tokio::test]
    async fn test_drivers_without_license_coexist() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        for username in ["a", "b"] {
            let new = NewDriver {
                username: username.to_string(),
                password: "test123".to_string(),
                ..NewDriver::default()
            };
            Driver::create(&pool, &hasher, &new).await.unwrap();
        }
        assert_eq!(Driver::count(&pool, None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        let driver = Driver::create(&pool, &hasher, &test1()).await.unwrap();

        let found = Driver::authenticate(&pool, &hasher, "test1", "test123")
            .await
            .unwrap();
        assert_eq!(found.map(|d| d.id), Some(driver.id));
        assert!(Driver::authenticate(&pool, &hasher, "test1", "nope")
            .await
            .unwrap()
            .is_none());
        assert!(Driver::authenticate(&pool, &hasher, "ghost", "test123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_inactive_driver_cannot_authenticate() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        let driver = Driver::create(&pool, &hasher, &test1()).await.unwrap();
        let changes = DriverChanges {
            username: driver.username.clone(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            license_number: driver.license_number.clone(),
            is_staff: false,
            is_superuser: false,
            is_active: false,
        };
        Driver::update(&pool, driver.id, &changes).await.unwrap();

        assert!(Driver::authenticate(&pool, &hasher, "test1", "test123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_license_and_uniqueness() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        let driver = Driver::create(&pool, &hasher, &test1()).await.unwrap();

        let updated = Driver::update_license(&pool, driver.id, "CBA54321")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.license(), "CBA54321");

        assert!(Driver::license_taken(&pool, "CBA54321", None).await.unwrap());
        assert!(!Driver::license_taken(&pool, "CBA54321", Some(driver.id))
            .await
            .unwrap());
        assert!(!Driver::license_taken(&pool, "ABC12345", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_violation_names_the_column() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        let driver = Driver::create(&pool, &hasher, &test1()).await.unwrap();

        let same_username = NewDriver {
            license_number: Some("XYZ54321".to_string()),
            ..test1()
        };
        match Driver::create(&pool, &hasher, &same_username).await {
            Err(TaxiError::Database(e)) => {
                assert_eq!(unique_violation_field(&e), Some("username"));
            }
            other => panic!("expected a unique violation, got {other:?}"),
        }

        let other = Driver::create(
            &pool,
            &hasher,
            &NewDriver {
                username: "test2".to_string(),
                license_number: Some("XYZ54321".to_string()),
                ..test1()
            },
        )
        .await
        .unwrap();
        let e = Driver::update_license(&pool, other.id, driver.license())
            .await
            .unwrap_err();
        assert_eq!(unique_violation_field(&e), Some("license_number"));
        assert_eq!(unique_violation_field(&sqlx::Error::RowNotFound), None);
    }

    #[tokio::test]
    async fn test_search_orders_by_username() {
        let pool = db::memory_pool().await.unwrap();
        let hasher = hasher();
        for username in ["zoe", "adam", "Zack"] {
            let new = NewDriver {
                username: username.to_string(),
                password: "test123".to_string(),
                ..NewDriver::default()
            };
            Driver::create(&pool, &hasher, &new).await.unwrap();
        }

        let hits = Driver::search(&pool, Some("z"), 5, 0).await.unwrap();
        let names: Vec<_> = hits.iter().map(|d| d.username.as_str()).collect();
        assert_eq!(names, ["Zack", "zoe"]);
    }
}
