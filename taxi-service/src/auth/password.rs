//! Password hashing and verification using Argon2id
//!
//! Hashes are stored as PHC strings, so verification reads the parameters
//! back from the hash and keeps working after the configured cost changes.
//!
//! # Example
//!
//! ```rust
//! use taxi_service::auth::password::{PasswordHashConfig, PasswordHasher};
//!
//! # fn example() -> anyhow::Result<()> {
//! let hasher = PasswordHasher::with_config(PasswordHashConfig {
//!     memory_cost: 1024,
//!     iterations: 1,
//!     ..PasswordHashConfig::default()
//! });
//!
//! let hash = hasher.hash("driving-since-1998")?;
//! assert!(hasher.verify("driving-since-1998", &hash)?);
//! assert!(!hasher.verify("wrong-password", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Verification failed for a reason other than a wrong password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Configured Argon2 parameters are out of range
    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,

    /// Output hash length in bytes
    pub output_length: usize,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB, OWASP minimum
            iterations: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

/// Argon2id password hasher
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    config: PasswordHashConfig,
}

impl PasswordHasher {
    /// Hasher with default parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with custom parameters
    #[must_use]
    pub const fn with_config(config: PasswordHashConfig) -> Self {
        Self { config }
    }

    /// Hash a password with a fresh random salt
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidParams`] for out-of-range parameters,
    /// or [`PasswordError::HashingFailed`] if Argon2 fails
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.iterations,
            self.config.parallelism,
            Some(self.config.output_length),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Check a password against a stored PHC hash
    ///
    /// Returns `Ok(false)` for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidHash`] if the stored hash cannot be
    /// parsed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }

    /// Parameters used for new hashes
    #[must_use]
    pub const fn config(&self) -> &PasswordHashConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1024,
            iterations: 1,
            ..PasswordHashConfig::default()
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("test1234!@#").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("test1234!@#", &hash).unwrap());
        assert!(!hasher.verify("test1234", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = fast_hasher();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_uses_stored_params() {
        let hash = fast_hasher().hash("user12test").unwrap();
        assert!(PasswordHasher::new().verify("user12test", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash() {
        let result = fast_hasher().verify("x", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_invalid_params() {
        let hasher = PasswordHasher::with_config(PasswordHashConfig {
            memory_cost: 1,
            ..PasswordHashConfig::default()
        });
        assert!(matches!(hasher.hash("x"), Err(PasswordError::InvalidParams(_))));
    }
}
