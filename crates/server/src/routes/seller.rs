//! Seller dashboard route handlers.
//!
//! Every mutation is scoped to the caller's own listings; the repository
//! enforces ownership in the WHERE clause.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use mercado_core::{CategoryId, ProductId};

use crate::db::products::{NewProduct, ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireSeller;
use crate::models::Product;
use crate::services::storage::PRODUCT_IMAGES_BUCKET;
use crate::state::AppState;

const DASHBOARD_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub unit: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

const fn default_active() -> bool {
    true
}

impl ProductPayload {
    fn validate(self) -> Result<NewProduct> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_owned()));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::BadRequest("price must be positive".to_owned()));
        }
        if self.stock < 0 {
            return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
        }

        Ok(NewProduct {
            category_id: self.category_id,
            name,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            stock: self.stock,
            images: self.images,
            unit: self.unit,
            is_active: self.is_active,
            tags: self.tags,
        })
    }
}

/// The caller's listings, inactive ones included.
#[instrument(skip(state, user), fields(seller_id = %user.id))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .search(&ProductFilter {
            seller_id: Some(user.id),
            include_inactive: true,
            limit: DASHBOARD_PAGE_SIZE,
            ..Default::default()
        })
        .await?;

    Ok(Json(products))
}

/// Create a listing.
#[instrument(skip(state, user, payload), fields(seller_id = %user.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse> {
    let new = payload.validate()?;
    let product = ProductRepository::new(state.pool())
        .create(user.id, &new)
        .await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a listing's fields.
#[instrument(skip(state, user, payload), fields(seller_id = %user.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let new = payload.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, user.id, &new)
        .await?;

    Ok(Json(product))
}

/// Upload a product photo and return its public URL.
///
/// The dashboard uploads photos first, then submits the listing with the
/// returned URLs in `images`.
#[instrument(skip(state, user, multipart), fields(seller_id = %user.id))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let (content_type, bytes) = super::orders::read_image_field(&mut multipart).await?;

    let path = format!("{}/{}", user.id, uuid::Uuid::new_v4().simple());
    let url = state
        .storage()
        .upload(PRODUCT_IMAGES_BUCKET, &path, &content_type, bytes)
        .await?;

    Ok(Json(json!({ "url": url })))
}

/// Delete a listing.
///
/// Listings referenced by order history can't be deleted; deactivate them
/// instead.
#[instrument(skip(state, user), fields(seller_id = %user.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool())
        .delete(id, user.id)
        .await?;

    Ok(Json(json!({ "ok": true })))
}
