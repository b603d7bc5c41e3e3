//! Product repository.
//!
//! Marketplace search goes through [`ProductRepository::search`], which
//! builds one query from the optional filters. Seller mutations are scoped
//! by `seller_id` in the WHERE clause so ownership is enforced at the row
//! level, not just in handlers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use mercado_core::{CategoryId, ProductId, ProfileId};

use super::RepositoryError;
use crate::models::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    seller_id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    stock: i32,
    images: Vec<String>,
    unit: Option<String>,
    is_active: bool,
    is_featured: bool,
    rating: Decimal,
    review_count: i32,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            seller_id: ProfileId::new(r.seller_id),
            category_id: r.category_id.map(CategoryId::new),
            name: r.name,
            description: r.description,
            price: r.price,
            original_price: r.original_price,
            stock: r.stock,
            images: r.images,
            unit: r.unit,
            is_active: r.is_active,
            is_featured: r.is_featured,
            rating: r.rating,
            review_count: r.review_count,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, seller_id, category_id, name, description, price, \
     original_price, stock, images, unit, is_active, is_featured, rating, review_count, tags, \
     created_at, updated_at";

/// Filters for the public product search.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on name or description.
    pub query: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag: Option<String>,
    pub featured_only: bool,
    /// Restrict to one seller (public shop page or seller dashboard).
    pub seller_id: Option<ProfileId>,
    /// Dashboard views include inactive listings; the marketplace does not.
    pub include_inactive: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a listing.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i32,
    pub images: Vec<String>,
    pub unit: Option<String>,
    pub is_active: bool,
    pub tags: Vec<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Search products with the given filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if !filter.include_inactive {
            qb.push(" AND is_active = TRUE");
        }
        if let Some(q) = &filter.query {
            let pattern = format!("%{q}%");
            qb.push(" AND (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(tag) = &filter.tag {
            qb.push(" AND ");
            qb.push_bind(tag.clone());
            qb.push(" = ANY(tags)");
        }
        if filter.featured_only {
            qb.push(" AND is_featured = TRUE");
        }
        if let Some(seller_id) = filter.seller_id {
            qb.push(" AND seller_id = ");
            qb.push_bind(seller_id);
        }

        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a listing owned by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category reference is
    /// invalid, `Database` for other failures.
    pub async fn create(
        &self,
        seller_id: ProfileId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products \
                (id, seller_id, category_id, name, description, price, original_price, stock, \
                 images, unit, is_active, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(ProductId::generate())
            .bind(seller_id)
            .bind(new.category_id)
            .bind(&new.name)
            .bind(new.description.as_deref())
            .bind(new.price)
            .bind(new.original_price)
            .bind(new.stock)
            .bind(&new.images)
            .bind(new.unit.as_deref())
            .bind(new.is_active)
            .bind(&new.tags)
            .fetch_one(self.pool)
            .await
            .map_err(fk_to_conflict)?;

        Ok(Product::from(row))
    }

    /// Replace a listing's editable fields. Scoped to the owning seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// belongs to another seller.
    pub async fn update(
        &self,
        id: ProductId,
        seller_id: ProfileId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET \
                category_id = $3, name = $4, description = $5, price = $6, \
                original_price = $7, stock = $8, images = $9, unit = $10, is_active = $11, \
                tags = $12, updated_at = NOW() \
             WHERE id = $1 AND seller_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(seller_id)
            .bind(new.category_id)
            .bind(&new.name)
            .bind(new.description.as_deref())
            .bind(new.price)
            .bind(new.original_price)
            .bind(new.stock)
            .bind(&new.images)
            .bind(new.unit.as_deref())
            .bind(new.is_active)
            .bind(&new.tags)
            .fetch_optional(self.pool)
            .await
            .map_err(fk_to_conflict)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Product::from(row))
    }

    /// Delete a listing. Scoped to the owning seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// belongs to another seller, or `Conflict` if order history references
    /// it.
    pub async fn delete(&self, id: ProductId, seller_id: ProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id)
            .bind(seller_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product appears in order history; deactivate it instead".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Toggle the admin-curated featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_featured(&self, id: ProductId, featured: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET is_featured = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(featured)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn fk_to_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("referenced category does not exist".to_owned());
    }
    RepositoryError::Database(e)
}
