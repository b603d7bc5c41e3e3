//! Catalog models: categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercado_core::{CategoryId, ProductId, ProfileId};

/// An admin-managed product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-safe identifier derived from the name at creation time.
    pub slug: String,
    pub description: Option<String>,
    /// Icon identifier rendered by clients.
    pub icon: Option<String>,
    pub image_url: Option<String>,
    /// Parent category for nested taxonomies; `None` for top-level.
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

/// A seller-owned product listing.
///
/// `rating` and `review_count` are denormalized aggregates that are never
/// recomputed transactionally; `stock` is a ceiling for cart quantities and
/// is not decremented by checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: ProfileId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Pre-discount price shown struck through, when set.
    pub original_price: Option<Decimal>,
    pub stock: i32,
    /// Ordered image URLs; the first one is the primary image.
    pub images: Vec<String>,
    /// Sale unit label ("kg", "unidad", ...).
    pub unit: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: Decimal,
    pub review_count: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.is_active && self.stock > 0
    }

    /// Primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Derive a URL-safe slug from a category name.
///
/// Lowercases the name, collapses every run of non-alphanumeric characters
/// into a single `-`, and strips leading/trailing dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("Home & Garden"), "home-garden");
    }

    #[test]
    fn test_slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("  Frutas --- Verduras!  "), "frutas-verduras");
        assert_eq!(slugify("¡Ofertas!"), "ofertas");
    }

    #[test]
    fn test_slugify_all_symbols_yields_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
