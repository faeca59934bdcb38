//! taxi-service command line

#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CreateSuperuserCommand, MigrateCommand, ServeCommand};
use taxi_service::config::TaxiConfig;

#[derive(Parser)]
#[command(name = "taxi-service")]
#[command(version)]
#[command(about = "Fleet management for manufacturers, cars and drivers", long_about = None)]
struct Cli {
    /// Config file read in place of ./config.toml
    #[arg(long, global = true, env = "TAXI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Create a staff superuser
    CreateSuperuser {
        /// Login name
        #[arg(long)]
        username: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<TaxiConfig> {
        let config = match &self.config {
            Some(path) => TaxiConfig::load_from(path)?,
            None => TaxiConfig::load()?,
        };
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command {
        Commands::Serve => ServeCommand::new(config).execute().await?,
        Commands::Migrate => MigrateCommand::new(config).execute().await?,
        Commands::CreateSuperuser { username, password } => {
            CreateSuperuserCommand::new(config, username, password)
                .execute()
                .await?;
        }
    }

    Ok(())
}
