//! Public catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mercado_core::{ProductId, ProfileId};

use crate::db::categories::CategoryRepository;
use crate::db::products::{ProductFilter, ProductRepository};
use crate::db::profiles::ProfileRepository;
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Category, Product, Review};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 24;
const MAX_PAGE_SIZE: i64 = 100;

/// List all categories.
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring match on name or description.
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Search active products.
#[instrument(skip(state))]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>> {
    let category_id = match params.category.as_deref() {
        Some(slug) => Some(
            CategoryRepository::new(state.pool())
                .get_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("category '{slug}'")))?
                .id,
        ),
        None => None,
    };

    let filter = ProductFilter {
        query: params.q.filter(|q| !q.trim().is_empty()),
        category_id,
        tag: params.tag,
        featured_only: params.featured,
        seller_id: None,
        include_inactive: false,
        limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset: params.offset.unwrap_or(0).max(0),
    };

    let products = ProductRepository::new(state.pool()).search(&filter).await?;
    Ok(Json(products))
}

/// Product detail. Inactive products 404 on the public surface.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// List a product's reviews.
#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub rating: i16,
    pub comment: Option<String>,
}

/// Create or replace the caller's review of a product.
///
/// Reviews are not validated against purchase history.
#[instrument(skip(state, user, payload), fields(buyer_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be 1 to 5".to_owned()));
    }

    let review = ReviewRepository::new(state.pool())
        .upsert(
            id,
            user.id,
            payload.rating,
            payload
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty()),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Public shop page payload.
#[derive(Debug, Serialize)]
pub struct SellerShop {
    pub seller_id: ProfileId,
    pub shop_name: Option<String>,
    pub shop_description: Option<String>,
    pub shop_logo_url: Option<String>,
    pub products: Vec<Product>,
}

/// A seller's public shop: branding plus active listings.
#[instrument(skip(state))]
pub async fn seller_shop(
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
) -> Result<Json<SellerShop>> {
    let profile = ProfileRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .filter(|p| p.roles.seller)
        .ok_or_else(|| AppError::NotFound(format!("seller {id}")))?;

    let products = ProductRepository::new(state.pool())
        .search(&ProductFilter {
            seller_id: Some(id),
            limit: MAX_PAGE_SIZE,
            ..Default::default()
        })
        .await?;

    Ok(Json(SellerShop {
        seller_id: profile.id,
        shop_name: profile.shop_name,
        shop_description: profile.shop_description,
        shop_logo_url: profile.shop_logo_url,
        products,
    }))
}
