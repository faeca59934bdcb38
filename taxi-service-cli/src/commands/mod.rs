//! CLI command implementations

pub mod migrate;
pub mod serve;
pub mod superuser;

pub use migrate::MigrateCommand;
pub use serve::ServeCommand;
pub use superuser::CreateSuperuserCommand;
