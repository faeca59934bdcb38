//! Vehicle manufacturers

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::contains_pattern;

/// A vehicle maker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Manufacturer {
    /// Primary key
    pub id: i64,
    /// Unique name
    pub name: String,
    /// Country of origin
    pub country: String,
}

impl std::fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

impl Manufacturer {
    /// Detail page path
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/manufacturers/{}/", self.id)
    }

    /// Insert a manufacturer
    ///
    /// # Errors
    ///
    /// Returns a database error, including a unique violation on `name`
    pub async fn create(pool: &SqlitePool, name: &str, country: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO manufacturers (name, country) VALUES (?, ?) RETURNING id, name, country",
        )
        .bind(name)
        .bind(country)
        .fetch_one(pool)
        .await
    }

    /// Update name and country, returning `None` if the row is gone
    ///
    /// # Errors
    ///
    /// Returns a database error, including a unique violation on `name`
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
        country: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE manufacturers SET name = ?, country = ?
             WHERE id = ? RETURNING id, name, country",
        )
        .bind(name)
        .bind(country)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a manufacturer and, by cascade, its cars
    ///
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?")
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
        sqlx::query_as("SELECT id, name, country FROM manufacturers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find by exact name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, country FROM manufacturers WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Every manufacturer, ordered by name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, country FROM manufacturers ORDER BY name, id")
            .fetch_all(pool)
            .await
    }

    /// Number of manufacturers whose name contains `name` (all when `None`)
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn count(pool: &SqlitePool, name: Option<&str>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM manufacturers WHERE ? IS NULL OR name LIKE ? ESCAPE '\\'",
        )
        .bind(name)
        .bind(name.map(contains_pattern))
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One page of manufacturers whose name contains `name`, ordered by name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn search(
        pool: &SqlitePool,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, country FROM manufacturers
             WHERE ? IS NULL OR name LIKE ? ESCAPE '\\'
             ORDER BY name, id LIMIT ? OFFSET ?",
        )
        .bind(name)
        .bind(name.map(contains_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_manufacturer_display() {
        let manufacturer = Manufacturer {
            id: 1,
            name: "test".to_string(),
            country: "Ukraine".to_string(),
        };
        assert_eq!(manufacturer.to_string(), "test Ukraine");
        assert_eq!(manufacturer.absolute_url(), "/manufacturers/1/");
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = db::memory_pool().await.unwrap();
        let created = Manufacturer::create(&pool, "Lincoln", "USA").await.unwrap();

        let found = Manufacturer::find_by_name(&pool, "Lincoln").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(Manufacturer::find_by_id(&pool, created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = db::memory_pool().await.unwrap();
        Manufacturer::create(&pool, "Volvo", "Sweden").await.unwrap();

        let err = Manufacturer::create(&pool, "Volvo", "China").await.unwrap_err();
        assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let pool = db::memory_pool().await.unwrap();
        for (name, country) in [("Toyota", "Japan"), ("Tesla", "USA"), ("Audi", "Germany")] {
            Manufacturer::create(&pool, name, country).await.unwrap();
        }

        let hits = Manufacturer::search(&pool, Some("T"), 10, 0).await.unwrap();
        let names: Vec<_> = hits.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Tesla", "Toyota"]);
        assert_eq!(Manufacturer::count(&pool, Some("t")).await.unwrap(), 2);
        assert_eq!(Manufacturer::count(&pool, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let pool = db::memory_pool().await.unwrap();
        Manufacturer::create(&pool, "Opel", "Germany").await.unwrap();

        assert_eq!(Manufacturer::count(&pool, Some("%")).await.unwrap(), 0);
        assert_eq!(Manufacturer::count(&pool, Some("_pel")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = db::memory_pool().await.unwrap();
        let old = Manufacturer::create(&pool, "Old Manufacturer", "Old Country")
            .await
            .unwrap();

        let updated = Manufacturer::update(&pool, old.id, "Updated Manufacturer", "Updated Country")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Updated Manufacturer");

        assert!(Manufacturer::delete(&pool, old.id).await.unwrap());
        assert!(!Manufacturer::delete(&pool, old.id).await.unwrap());
        assert!(Manufacturer::find_by_name(&pool, "Updated Manufacturer")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() {
        let pool = db::memory_pool().await.unwrap();
        Manufacturer::create(&pool, "Škoda", "Czechia").await.unwrap();
        Manufacturer::create(&pool, "Skoda Classic", "Czechia").await.unwrap();

        let ascii = Manufacturer::search(&pool, Some("skoda"), 5, 0).await.unwrap();
        assert_eq!(ascii.len(), 1);
        assert_eq!(ascii[0].name, "Skoda Classic");

        assert_eq!(Manufacturer::count(&pool, Some("škoda")).await.unwrap(), 0);
        assert_eq!(Manufacturer::count(&pool, Some("Škoda")).await.unwrap(), 1);
    }
}
