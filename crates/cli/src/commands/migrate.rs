//! Database migration command.
//!
//! Runs the application migrations from `crates/server/migrations/` and the
//! tower-sessions store migration. The server never migrates on startup;
//! this command is the only migration path.

use tower_sessions_sqlx_store::PostgresStore;

use super::CliError;

/// Run all database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running application migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
