//! CLI command implementations.

pub mod migrate;
pub mod role;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No account with the given email.
    #[error("No account found for email: {0}")]
    NoSuchAccount(String),

    /// Invalid role flag name.
    #[error("Invalid role: {0}. Valid roles: seller, admin, delivery")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Repository error from the server crate.
    #[error("Repository error: {0}")]
    Repository(#[from] mercado_server::db::RepositoryError),

    /// Authentication error while creating demo accounts.
    #[error("Auth error: {0}")]
    Auth(#[from] mercado_server::services::auth::AuthError),
}

/// Connect using `MERCADO_DATABASE_URL` (falling back to `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MERCADO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("MERCADO_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(mercado_server::db::create_pool(&database_url).await?)
}
