//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! people-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PEOPLE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time:
//! ```text
//! migrations/
//! └── 20261017000001_create_people_schema.sql
//! ```

use people_api::config::{ApiConfig, ConfigError};
use people_api::db;

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations against the people database.
///
/// # Errors
///
/// Returns `MigrationError` if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to people database...");
    let pool = db::create_pool(&config.database_url, &config.database).await?;

    tracing::info!("Running people migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("People migrations complete!");
    Ok(())
}
