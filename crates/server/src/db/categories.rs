//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    icon: Option<String>,
    image_url: Option<String>,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(r.id),
            name: r.name,
            slug: r.slug,
            description: r.description,
            icon: r.icon,
            image_url: r.image_url,
            parent_id: r.parent_id.map(CategoryId::new),
            created_at: r.created_at,
        }
    }
}

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, icon, image_url, parent_id, created_at";

/// New category fields (admin).
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories in name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let sql = format!(
            "INSERT INTO categories (id, name, slug, description, icon, image_url, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(CategoryId::generate().as_uuid())
            .bind(&new.name)
            .bind(&new.slug)
            .bind(new.description.as_deref())
            .bind(new.icon.as_deref())
            .bind(new.image_url.as_deref())
            .bind(new.parent_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "a category with this slug already exists".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(Category::from(row))
    }

    /// Update a category's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist, or
    /// `Conflict` if the new slug collides.
    pub async fn update(
        &self,
        id: CategoryId,
        new: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "UPDATE categories SET name = $2, slug = $3, description = $4, icon = $5, \
                image_url = $6, parent_id = $7 \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_uuid())
            .bind(&new.name)
            .bind(&new.slug)
            .bind(new.description.as_deref())
            .bind(new.icon.as_deref())
            .bind(new.image_url.as_deref())
            .bind(new.parent_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "a category with this slug already exists".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Category::from(row))
    }

    /// Delete a category.
    ///
    /// Products referencing the category block deletion; the foreign key
    /// violation surfaces as a `Conflict` with a hint the admin UI shows
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist, or
    /// `Conflict` if products still reference it.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "category still has products; move or delete them first".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
