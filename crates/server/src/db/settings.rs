//! Site settings repository.
//!
//! A small key-value table. The only key the application writes today is
//! [`PAYMENT_QR_KEY`], the admin-configured QR image shown at checkout.

use sqlx::PgPool;

use super::RepositoryError;

/// Setting key holding the payment QR image URL.
pub const PAYMENT_QR_KEY: &str = "payment_qr_url";

/// Repository for site settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value =
            sqlx::query_scalar::<_, String>("SELECT value FROM site_settings WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        Ok(value)
    }

    /// Insert or replace a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO site_settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
