//! Fleet records: manufacturers, drivers and cars

pub mod car;
pub mod driver;
pub mod manufacturer;

pub use car::{Car, CarInput};
pub use driver::{Driver, DriverChanges, NewDriver};
pub use manufacturer::Manufacturer;

/// Whether a database error is a unique constraint violation
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Column named by a unique constraint violation
///
/// SQLite reports `UNIQUE constraint failed: drivers.license_number`; this
/// returns `license_number`.
#[must_use]
pub fn unique_violation_field(error: &sqlx::Error) -> Option<&str> {
    let error = error.as_database_error().filter(|e| e.is_unique_violation())?;
    error.message().rsplit('.').next()
}
