//! Create a staff superuser

use anyhow::{bail, Result};
use console::style;
use dialoguer::Password;
use taxi_service::auth::PasswordHasher;
use taxi_service::config::TaxiConfig;
use taxi_service::db;
use taxi_service::forms::{password_problems, validate_username};
use taxi_service::models::{Driver, NewDriver};

/// Create a driver with staff and superuser status
pub struct CreateSuperuserCommand {
    config: TaxiConfig,
    username: String,
    password: Option<String>,
}

impl CreateSuperuserCommand {
    /// Command for `username`, prompting for the password when `None`
    pub const fn new(config: TaxiConfig, username: String, password: Option<String>) -> Self {
        Self {
            config,
            username,
            password,
        }
    }

    /// Validate, hash, and insert the account
    pub async fn execute(self) -> Result<()> {
        let username = self.username.trim().to_string();
        if let Err(e) = validate_username(&username) {
            bail!("Invalid username: {e}");
        }

        let password = match self.password {
            Some(password) => password,
            None => Password::new()
                .with_prompt("Password")
                .with_confirmation("Password (again)", "Error: Your passwords didn't match.")
                .interact()?,
        };

        let problems = password_problems(&password, &username);
        if !problems.is_empty() {
            bail!("Password rejected: {}", problems.join(" "));
        }

        let pool = db::connect(&self.config.database).await?;
        db::migrate(&pool).await?;

        if Driver::find_by_username(&pool, &username).await?.is_some() {
            bail!("Error: That username is already taken.");
        }

        let hasher = PasswordHasher::with_config(self.config.password.clone());
        let driver = Driver::create(
            &pool,
            &hasher,
            &NewDriver {
                username,
                password,
                is_staff: true,
                is_superuser: true,
                ..NewDriver::default()
            },
        )
        .await?;
        pool.close().await;

        println!(
            "{} {}",
            style("Superuser created:").green().bold(),
            style(&driver.username).cyan()
        );
        Ok(())
    }
}
