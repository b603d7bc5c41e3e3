//! Buyer order route handlers.
//!
//! All operations here are scoped to the caller's own orders.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde_json::json;
use tracing::instrument;

use mercado_core::lifecycle::{check_transition, proof_submitted};
use mercado_core::{Actor, OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::OrderWithItems;
use crate::services::storage::PAYMENT_PROOFS_BUCKET;
use crate::state::AppState;

/// Uploaded images above this size are rejected (5 MiB). The upload routes
/// raise axum's body limit past this so the check here is the one that fires.
pub(crate) const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// List the caller's orders, newest first.
#[instrument(skip(state, user), fields(buyer_id = %user.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_buyer(user.id)
        .await?;
    Ok(Json(orders))
}

/// One of the caller's orders.
#[instrument(skip(state, user), fields(buyer_id = %user.id))]
pub async fn get_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let order = fetch_own_order(&state, &user, id).await?;
    Ok(Json(order))
}

/// Cancel a pending order.
///
/// Buyers may only cancel while the order is still `pending`; the update is
/// compare-and-set so a concurrent confirmation wins cleanly.
#[instrument(skip(state, user), fields(buyer_id = %user.id))]
pub async fn cancel_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let current = fetch_own_order(&state, &user, id).await?;

    check_transition(Actor::Buyer, current.order.status, OrderStatus::Cancelled)?;

    let repo = OrderRepository::new(state.pool());
    repo.update_status(id, current.order.status, OrderStatus::Cancelled)
        .await?;

    let order = fetch_own_order(&state, &user, id).await?;
    tracing::info!(order = %order.order.reference(), "order cancelled by buyer");
    Ok(Json(order))
}

/// Upload a proof of transfer image for a QR order.
///
/// Stores the image, records its URL, and resets `payment_status` to
/// `pending` so the admin reviews it, even after a rejection. Terminal
/// orders take no further proofs.
#[instrument(skip(state, user, multipart), fields(buyer_id = %user.id))]
pub async fn upload_proof(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let order = fetch_own_order(&state, &user, id).await?;
    if !order.order.payment_method.requires_verification() {
        return Err(AppError::BadRequest(
            "only QR orders take a proof of payment".to_owned(),
        ));
    }
    let payment_status = proof_submitted(order.order.status)?;

    let (content_type, bytes) = read_image_field(&mut multipart).await?;
    let path = format!("{}/{}", user.id, id.as_uuid().simple());
    let proof_url = state
        .storage()
        .upload(PAYMENT_PROOFS_BUCKET, &path, &content_type, bytes)
        .await?;

    OrderRepository::new(state.pool())
        .set_payment_proof(id, user.id, order.order.status, &proof_url, payment_status)
        .await?;

    tracing::info!(order = %order.order.reference(), "payment proof submitted");
    Ok(Json(json!({ "payment_proof_url": proof_url })))
}

async fn fetch_own_order(
    state: &AppState,
    user: &crate::models::CurrentUser,
    id: OrderId,
) -> Result<OrderWithItems> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    // Hide other buyers' orders entirely rather than answering 403.
    if order.order.buyer_id != user.id {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    Ok(order)
}

/// Pull the first file field out of a multipart body.
///
/// Shared with the seller dashboard's product photo upload.
pub(crate) async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.file_name().is_none() {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest("proof must be an image".to_owned()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest("image too large".to_owned()));
        }

        return Ok((content_type, bytes.to_vec()));
    }

    Err(AppError::BadRequest("no image field in upload".to_owned()))
}
