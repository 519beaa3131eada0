//! Storage infrastructure - connection pool and schema migrations

pub mod migrations;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

pub use migrations::{run_storage_migrations, Migration, Migrator, PostgresMigrator};

/// Connect to PostgreSQL using the configured URL
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config.url.as_deref().ok_or_else(|| {
        DomainError::configuration(
            "database.url (or DATABASE_URL) is required for postgres storage",
        )
    })?;

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;
    info!("PostgreSQL connection established");

    Ok(pool)
}
