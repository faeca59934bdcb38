//! Configuration management for taxi-service
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `TAXI_` prefix, `__` nesting)
//! 2. An explicit file, or `./config.toml` (development)
//! 3. `~/.config/taxi-service/config.toml` (user config, XDG)
//! 4. `/etc/taxi-service/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! login_path = "/accounts/login/"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [database]
//! url = "sqlite://./taxi.db"
//! max_connections = 5
//!
//! [session]
//! cookie_name = "taxi_session"
//! max_age_secs = 1209600
//! purge_interval_secs = 3600
//! same_site = "lax"
//!
//! [password]
//! memory_cost = 19456
//! iterations = 2
//! ```
//!
//! Any value can be overridden from the environment, for example
//! `TAXI_SERVER__PORT=9000` or `TAXI_DATABASE__URL=sqlite::memory:`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::auth::PasswordHashConfig;
use crate::error::TaxiError;

/// Application name used for config directories
pub const APP_NAME: &str = "taxi-service";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TAXI_";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerSettings {
    /// Socket address built from `host` and `port`
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::Config`] if the host is not a valid IP address
    pub fn socket_addr(&self) -> Result<SocketAddr, TaxiError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| TaxiError::Config(format!("invalid server address: {e}")))
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite connection URL
    pub url: String,

    /// Maximum pool size
    pub max_connections: u32,

    /// Create the database file when it does not exist
    pub create_if_missing: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://taxi.db".to_string(),
            max_connections: 5,
            create_if_missing: true,
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Name of the session cookie
    pub cookie_name: String,

    /// Session lifetime in seconds
    pub max_age_secs: u64,

    /// Seconds between sweeps deleting expired sessions
    pub purge_interval_secs: u64,

    /// Mark the cookie `Secure` (HTTPS only)
    pub secure: bool,

    /// SameSite policy for the cookie
    pub same_site: SameSitePolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "taxi_session".to_string(),
            max_age_secs: 14 * 24 * 60 * 60,
            purge_interval_secs: 60 * 60,
            secure: !cfg!(debug_assertions),
            same_site: SameSitePolicy::Lax,
        }
    }
}

/// SameSite cookie policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// Strict same-site policy
    Strict,
    /// Lax same-site policy
    #[default]
    Lax,
    /// No same-site restriction (requires Secure)
    None,
}

impl SameSitePolicy {
    /// Cookie attribute value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxiConfig {
    /// HTTP server settings
    pub server: ServerSettings,

    /// Database settings
    pub database: DatabaseSettings,

    /// Session cookie settings
    pub session: SessionSettings,

    /// Argon2 password hashing parameters
    pub password: PasswordHashConfig,

    /// Where unauthenticated visitors are sent
    pub login_path: String,
}

impl Default for TaxiConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            session: SessionSettings::default(),
            password: PasswordHashConfig::default(),
            login_path: "/accounts/login/".to_string(),
        }
    }
}

impl TaxiConfig {
    /// Load configuration from the standard locations
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::Config`] if a config file is malformed or a value
    /// has the wrong type
    pub fn load() -> Result<Self, TaxiError> {
        Self::figment(None).extract().map_err(config_error)
    }

    /// Load configuration with an explicit file taking the place of
    /// `./config.toml`
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::Config`] if the file is malformed or a value has
    /// the wrong type
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, TaxiError> {
        Self::figment(Some(path.as_ref())).extract().map_err(config_error)
    }

    /// Build the layered figment without extracting it
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(PathBuf::from("/etc").join(APP_NAME).join("config.toml")));

        if let Some(user_config) = user_config_path() {
            figment = figment.merge(Toml::file(user_config));
        }

        let local = explicit.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);

        figment
            .merge(Toml::file(local))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

fn config_error(error: figment::Error) -> TaxiError {
    TaxiError::Config(error.to_string())
}
