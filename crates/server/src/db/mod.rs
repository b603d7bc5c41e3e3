//! Database operations for the marketplace `PostgreSQL` instance.
//!
//! # Tables
//!
//! - `profiles` / `profile_passwords` - Identity records with role flags
//! - `categories` - Admin-managed catalog taxonomy
//! - `products` - Seller-owned listings
//! - `orders` / `order_items` - Purchases and their line-item snapshots
//! - `reviews` - Buyer product reviews
//! - `carts` - Per-user persisted carts (JSONB)
//! - `site_settings` - Key-value store (payment QR URL)
//! - tower-sessions storage (created by the store's own migration)
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p mercado-cli -- migrate
//! ```
//!
//! Queries use sqlx's runtime API (`query`/`query_as` with `FromRow` row
//! structs) and map rows into domain types by hand, surfacing bad stored
//! data as [`RepositoryError::DataCorruption`].

pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod profiles;
pub mod reviews;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Error type shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug, referenced rows).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The row changed under us (compare-and-set miss).
    #[error("concurrent modification: {0}")]
    Stale(String),
}

impl From<mercado_core::StatusParseError> for RepositoryError {
    fn from(e: mercado_core::StatusParseError) -> Self {
        Self::DataCorruption(e.to_string())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
