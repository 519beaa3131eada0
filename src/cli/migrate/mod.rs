//! Migrate command - applies or reverts the PostgreSQL schema

use std::process::ExitCode;

use clap::Args;
use tracing::info;

use crate::config::StorageBackend;
use crate::infrastructure::storage::{self, Migrator, PostgresMigrator};

/// Arguments for the migrate command
#[derive(Args, Clone, Debug, Default)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

/// Run the migrate command
pub async fn run(config_path: Option<&str>, args: MigrateArgs) -> anyhow::Result<ExitCode> {
    let config = super::bootstrap(config_path)?;

    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("migrations require the postgres storage backend");
    }

    let pool = storage::connect(&config.database).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    let version = migrator.version().await?;
    info!(?version, "Migrations complete");

    match version {
        Some(version) => println!("Schema version: {}", version),
        None => println!("Schema version: none"),
    }

    Ok(ExitCode::SUCCESS)
}
