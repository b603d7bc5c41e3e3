//! Cart persistence.
//!
//! One JSONB row per authenticated user. Anonymous carts live in the
//! session and are merged into the row at login.

use sqlx::PgPool;
use sqlx::types::Json;

use mercado_core::ProfileId;

use super::RepositoryError;
use crate::services::cart::Cart;

/// Repository for persisted carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart; an absent row is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored JSON doesn't
    /// deserialize.
    pub async fn get(&self, profile_id: ProfileId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_scalar::<_, Json<Cart>>(
            "SELECT items FROM carts WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::ColumnDecode { source, .. } => {
                RepositoryError::DataCorruption(format!("invalid cart JSON: {source}"))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.map(|Json(cart)| cart).unwrap_or_default())
    }

    /// Persist a user's cart, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(&self, profile_id: ProfileId, cart: &Cart) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO carts (profile_id, items) VALUES ($1, $2) \
             ON CONFLICT (profile_id) DO UPDATE SET items = EXCLUDED.items, updated_at = NOW()",
        )
        .bind(profile_id)
        .bind(Json(cart))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Drop a user's cart row (post-checkout clear).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, profile_id: ProfileId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM carts WHERE profile_id = $1")
            .bind(profile_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
