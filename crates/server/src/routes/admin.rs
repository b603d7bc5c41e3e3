//! Admin route handlers: orders, payment review, users, categories,
//! featured products, and site settings.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use mercado_core::lifecycle::{ReviewDecision, check_transition, review_payment};
use mercado_core::{Actor, CategoryId, OrderId, OrderStatus, ProductId, ProfileId};

use crate::db::categories::{CategoryRepository, NewCategory};
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::profiles::{ProfileRepository, RoleFlag};
use crate::db::settings::{PAYMENT_QR_KEY, SettingsRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, OrderWithItems, Profile, slugify};
use crate::state::AppState;

const ORDERS_PAGE_SIZE: i64 = 50;
const USERS_PAGE_SIZE: i64 = 100;

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// All orders, optionally filtered by lifecycle status.
#[instrument(skip(state, _user))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool())
        .list_all(
            params.status,
            params.limit.unwrap_or(ORDERS_PAGE_SIZE).clamp(1, 200),
            params.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
}

/// Move an order through the lifecycle as the admin actor.
#[instrument(skip(state, user), fields(admin_id = %user.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<OrderWithItems>> {
    let repo = OrderRepository::new(state.pool());
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    check_transition(Actor::Admin, current.order.status, payload.status)?;
    repo.update_status(id, current.order.status, payload.status)
        .await?;

    let order = fetch(&repo, id).await?;
    tracing::info!(
        order = %order.order.reference(),
        status = %order.order.status,
        "order status updated by admin"
    );
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct AssignPayload {
    /// Courier profile id, or null to unassign.
    pub delivery_id: Option<ProfileId>,
}

/// Assign or unassign a courier.
///
/// The target must hold the delivery role; there are no capacity checks.
#[instrument(skip(state, user), fields(admin_id = %user.id))]
pub async fn assign_courier(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<OrderWithItems>> {
    if let Some(delivery_id) = payload.delivery_id {
        let courier = ProfileRepository::new(state.pool())
            .get_by_id(delivery_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {delivery_id}")))?;
        if !courier.roles.delivery {
            return Err(AppError::BadRequest(
                "assignee does not hold the delivery role".to_owned(),
            ));
        }
    }

    let repo = OrderRepository::new(state.pool());
    repo.assign_delivery(id, payload.delivery_id).await?;

    Ok(Json(fetch(&repo, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub decision: ReviewDecision,
}

/// Review a submitted proof of payment.
///
/// Verifying sets `payment_status = verified` and force-confirms the order
/// in the same update; rejecting only flips `payment_status` and leaves the
/// lifecycle status alone. Terminal orders are frozen: verifying a cancelled
/// order must not resurrect it.
#[instrument(skip(state, user), fields(admin_id = %user.id))]
pub async fn review_payment_proof(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<OrderWithItems>> {
    let repo = OrderRepository::new(state.pool());
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !current.order.payment_method.requires_verification() {
        return Err(AppError::BadRequest(
            "cash orders have no payment review".to_owned(),
        ));
    }

    let review = review_payment(payload.decision, current.order.status)?;
    repo.apply_payment_review(id, current.order.status, review)
        .await?;

    let order = fetch(&repo, id).await?;
    tracing::info!(
        order = %order.order.reference(),
        payment_status = %order.order.payment_status,
        "payment reviewed"
    );
    Ok(Json(order))
}

async fn fetch(repo: &OrderRepository<'_>, id: OrderId) -> Result<OrderWithItems> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// All profiles, newest first.
#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<Profile>>> {
    let profiles = ProfileRepository::new(state.pool())
        .list(
            params.limit.unwrap_or(USERS_PAGE_SIZE).clamp(1, 500),
            params.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(profiles))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglableRole {
    Seller,
    Delivery,
}

#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub role: TogglableRole,
    pub enabled: bool,
}

/// Toggle a profile's seller or delivery flag.
///
/// Admin accounts are off limits: their flags can't be toggled from this
/// surface, and the admin flag itself is only granted via the CLI.
#[instrument(skip(state, user), fields(admin_id = %user.id))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProfileId>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<Profile>> {
    let repo = ProfileRepository::new(state.pool());
    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;

    if target.roles.admin {
        return Err(AppError::Forbidden(
            "cannot change roles of an admin account".to_owned(),
        ));
    }

    let flag = match payload.role {
        TogglableRole::Seller => RoleFlag::Seller,
        TogglableRole::Delivery => RoleFlag::Delivery,
    };
    repo.set_role_flag(id, flag, payload.enabled).await?;

    let profile = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
    Ok(Json(profile))
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
}

impl CategoryPayload {
    fn validate(self) -> Result<NewCategory> {
        let name = self.name.trim().to_owned();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "name must contain letters or digits".to_owned(),
            ));
        }

        Ok(NewCategory {
            name,
            slug,
            description: self.description,
            icon: self.icon,
            image_url: self.image_url,
            parent_id: self.parent_id,
        })
    }
}

/// Create a category; the slug is derived from the name.
#[instrument(skip(state, _user, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse> {
    let new = payload.validate()?;
    let category = CategoryRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category; renames re-derive the slug.
#[instrument(skip(state, _user, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    let new = payload.validate()?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &new)
        .await?;

    Ok(Json(category))
}

/// Delete a category. Blocked with a hint while products reference it.
#[instrument(skip(state, _user))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<serde_json::Value>> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "ok": true })))
}

// =============================================================================
// Featured products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FeaturedPayload {
    pub featured: bool,
}

/// Toggle a product's featured flag (any seller's).
#[instrument(skip(state, _user))]
pub async fn set_featured(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(payload): Json<FeaturedPayload>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool())
        .set_featured(id, payload.featured)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

// =============================================================================
// Settings
// =============================================================================

/// Current payment QR image URL.
#[instrument(skip(state, _user))]
pub async fn get_payment_qr(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
) -> Result<Json<serde_json::Value>> {
    let value = SettingsRepository::new(state.pool())
        .get(PAYMENT_QR_KEY)
        .await?;
    Ok(Json(json!({ "payment_qr_url": value })))
}

#[derive(Debug, Deserialize)]
pub struct PaymentQrPayload {
    pub payment_qr_url: String,
}

/// Set the payment QR image URL shown at checkout.
#[instrument(skip(state, _user, payload))]
pub async fn set_payment_qr(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Json(payload): Json<PaymentQrPayload>,
) -> Result<Json<serde_json::Value>> {
    let url = payload.payment_qr_url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("payment_qr_url is required".to_owned()));
    }
    url::Url::parse(url).map_err(|e| AppError::BadRequest(format!("invalid URL: {e}")))?;

    SettingsRepository::new(state.pool())
        .upsert(PAYMENT_QR_KEY, url)
        .await?;
    invalidate_settings(&state).await;

    Ok(Json(json!({ "payment_qr_url": url })))
}

async fn invalidate_settings(state: &AppState) {
    state
        .settings_cache()
        .invalidate(&PAYMENT_QR_KEY.to_owned())
        .await;
}
