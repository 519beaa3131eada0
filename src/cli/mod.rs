//! CLI module for the account provisioner
//!
//! Provides subcommands:
//! - `add-user`: create a user, prompting for anything not passed as a flag
//! - `migrate`: apply (or revert) the database schema migrations

pub mod add_user;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Account provisioner - create user accounts from the command line
#[derive(Parser)]
#[command(name = "account-provisioner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file, layered above config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a user account
    AddUser(add_user::AddUserArgs),

    /// Run database migrations
    Migrate(migrate::MigrateArgs),
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap(config_path: Option<&str>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_from(config_path)?;

    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_user_with_global_config() {
        let cli = Cli::try_parse_from([
            "account-provisioner",
            "add-user",
            "--email",
            "a@x.com",
            "--config",
            "config/test.toml",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some("config/test.toml"));
        assert!(matches!(cli.command, Command::AddUser(_)));
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from(["account-provisioner", "migrate", "--revert"]).unwrap();

        match cli.command {
            Command::Migrate(args) => assert!(args.revert),
            _ => panic!("expected migrate command"),
        }
    }
}
