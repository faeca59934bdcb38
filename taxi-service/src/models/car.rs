//! Cars and their driver assignments

use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::db::contains_pattern;

const SELECT_CAR: &str = "SELECT cars.id, cars.model, cars.manufacturer_id,
                                 manufacturers.name AS manufacturer_name,
                                 manufacturers.country AS manufacturer_country
                          FROM cars JOIN manufacturers ON manufacturers.id = cars.manufacturer_id";

/// A car joined with its manufacturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Car {
    /// Primary key
    pub id: i64,
    /// Model name
    pub model: String,
    /// Owning manufacturer
    pub manufacturer_id: i64,
    /// Manufacturer name
    pub manufacturer_name: String,
    /// Manufacturer country
    pub manufacturer_country: String,
}

impl std::fmt::Display for Car {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.model)
    }
}

/// Validated car fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarInput {
    /// Model name
    pub model: String,
    /// Existing manufacturer
    pub manufacturer_id: i64,
    /// Existing drivers to assign, without duplicates
    pub driver_ids: Vec<i64>,
}

impl Car {
    /// Detail page path
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/cars/{}/", self.id)
    }

    /// Manufacturer display string
    #[must_use]
    pub fn manufacturer_display(&self) -> String {
        format!("{} {}", self.manufacturer_name, self.manufacturer_country)
    }

    /// Insert a car and its driver assignments in one transaction
    ///
    /// # Errors
    ///
    /// Returns a database error; foreign key violations if the manufacturer or
    /// a driver does not exist
    pub async fn create(pool: &SqlitePool, input: &CarInput) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO cars (model, manufacturer_id) VALUES (?, ?) RETURNING id")
                .bind(&input.model)
                .bind(input.manufacturer_id)
                .fetch_one(&mut *tx)
                .await?;

        Self::replace_drivers(&mut tx, id, &input.driver_ids).await?;
        let car = Self::fetch_in(&mut tx, id).await?;
        tx.commit().await?;

        Ok(car)
    }

    /// Update model, manufacturer and drivers, returning `None` if the car is
    /// gone
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: &CarInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("UPDATE cars SET model = ?, manufacturer_id = ? WHERE id = ?")
            .bind(&input.model)
            .bind(input.manufacturer_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        Self::replace_drivers(&mut tx, id, &input.driver_ids).await?;
        let car = Self::fetch_in(&mut tx, id).await?;
        tx.commit().await?;

        Ok(Some(car))
    }

    async fn replace_drivers(
        tx: &mut Transaction<'_, Sqlite>,
        car_id: i64,
        driver_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM car_drivers WHERE car_id = ?")
            .bind(car_id)
            .execute(&mut **tx)
            .await?;

        for driver_id in driver_ids {
            sqlx::query("INSERT OR IGNORE INTO car_drivers (car_id, driver_id) VALUES (?, ?)")
                .bind(car_id)
                .bind(driver_id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    async fn fetch_in(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as(&format!("{SELECT_CAR} WHERE cars.id = ?"))
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a car and its assignments
    ///
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find by primary key
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!("{SELECT_CAR} WHERE cars.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of the drivers assigned to a car
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn driver_ids(pool: &SqlitePool, car_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT driver_id FROM car_drivers WHERE car_id = ? ORDER BY driver_id")
            .bind(car_id)
            .fetch_all(pool)
            .await
    }

    /// Assign the driver if absent, otherwise unassign them
    ///
    /// Returns `true` when the driver ends up assigned.
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn toggle_driver(
        pool: &SqlitePool,
        car_id: i64,
        driver_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM car_drivers WHERE car_id = ? AND driver_id = ?")
            .bind(car_id)
            .bind(driver_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO car_drivers (car_id, driver_id) VALUES (?, ?)")
                .bind(car_id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    /// Cars driven by a driver, ordered by id
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn for_driver(pool: &SqlitePool, driver_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{SELECT_CAR}
             WHERE cars.id IN (SELECT car_id FROM car_drivers WHERE driver_id = ?)
             ORDER BY cars.id"
        ))
        .bind(driver_id)
        .fetch_all(pool)
        .await
    }

    /// Cars made by a manufacturer, ordered by id
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn for_manufacturer(
        pool: &SqlitePool,
        manufacturer_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!("{SELECT_CAR} WHERE cars.manufacturer_id = ? ORDER BY cars.id"))
            .bind(manufacturer_id)
            .fetch_all(pool)
            .await
    }

    /// Number of cars whose model contains `model`, optionally restricted to
    /// one manufacturer
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn count(
        pool: &SqlitePool,
        model: Option<&str>,
        manufacturer_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM cars
             WHERE (? IS NULL OR model LIKE ? ESCAPE '\\')
               AND (? IS NULL OR manufacturer_id = ?)",
        )
        .bind(model)
        .bind(model.map(contains_pattern))
        .bind(manufacturer_id)
        .bind(manufacturer_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One page of cars whose model contains `model`, ordered by id
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn search(
        pool: &SqlitePool,
        model: Option<&str>,
        manufacturer_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{SELECT_CAR}
             WHERE (? IS NULL OR cars.model LIKE ? ESCAPE '\\')
               AND (? IS NULL OR cars.manufacturer_id = ?)
             ORDER BY cars.id LIMIT ? OFFSET ?"
        ))
        .bind(model)
        .bind(model.map(contains_pattern))
        .bind(manufacturer_id)
        .bind(manufacturer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
