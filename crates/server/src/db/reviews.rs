//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::{ProductId, ProfileId, ReviewId};

use super::RepositoryError;
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    buyer_id: Uuid,
    buyer_name: String,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(r.id),
            product_id: ProductId::new(r.product_id),
            buyer_id: ProfileId::new(r.buyer_id),
            buyer_name: r.buyer_name,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or replace the buyer's review of a product.
    ///
    /// One review per (product, buyer): submitting again overwrites the
    /// rating and comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product doesn't exist.
    pub async fn upsert(
        &self,
        product_id: ProductId,
        buyer_id: ProfileId,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "WITH upserted AS ( \
                INSERT INTO reviews (id, product_id, buyer_id, rating, comment) \
                VALUES ($1, $2, $3, $4, $5) \
                ON CONFLICT (product_id, buyer_id) \
                DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment \
                RETURNING id, product_id, buyer_id, rating, comment, created_at \
             ) \
             SELECT u.id, u.product_id, u.buyer_id, p.full_name AS buyer_name, \
                    u.rating, u.comment, u.created_at \
             FROM upserted u JOIN profiles p ON p.id = u.buyer_id",
        )
        .bind(ReviewId::generate())
        .bind(product_id)
        .bind(buyer_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("product does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(Review::from(row))
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT r.id, r.product_id, r.buyer_id, p.full_name AS buyer_name, \
                    r.rating, r.comment, r.created_at \
             FROM reviews r JOIN profiles p ON p.id = r.buyer_id \
             WHERE r.product_id = $1 \
             ORDER BY r.created_at DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }
}
