//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::db::profiles::ProfileRepository;
use crate::db::settings::{PAYMENT_QR_KEY, SettingsRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::checkout::{CheckoutRequest, build_order};
use crate::state::AppState;

/// Place an order from the caller's persisted cart.
///
/// On success the buyer's contact fields are refreshed from the form and the
/// cart is cleared. The order and its items are inserted in one transaction.
#[instrument(skip(state, user, request), fields(buyer_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get(user.id).await?;

    let draft = build_order(&cart, &request, state.config().delivery_fee)?;

    let order = OrderRepository::new(state.pool())
        .create(user.id, &draft)
        .await?;

    // Checkout doubles as the profile's contact update, as the form fields
    // were validated by build_order.
    ProfileRepository::new(state.pool())
        .update_contact(
            user.id,
            request.full_name.trim(),
            request.phone.trim(),
            request.address.trim(),
        )
        .await?;

    carts.clear(user.id).await?;

    tracing::info!(
        order = %order.order.reference(),
        total = %order.order.total,
        method = %order.order.payment_method,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// Checkout summary extras: the payment QR image and the delivery fee.
#[derive(Debug, Serialize)]
pub struct PaymentInfo {
    /// Admin-configured QR image URL, absent until set.
    pub payment_qr_url: Option<String>,
    pub delivery_fee: Decimal,
}

/// Payment details shown on the checkout summary.
///
/// The settings row is read through the in-memory cache; admin writes
/// invalidate it.
#[instrument(skip(state))]
pub async fn payment_qr(State(state): State<AppState>) -> Result<Json<PaymentInfo>> {
    let pool = state.pool().clone();
    let payment_qr_url = state
        .settings_cache()
        .try_get_with(PAYMENT_QR_KEY.to_owned(), async move {
            SettingsRepository::new(&pool).get(PAYMENT_QR_KEY).await
        })
        .await
        .map_err(|e| crate::error::AppError::Internal(format!("settings read failed: {e}")))?;

    Ok(Json(PaymentInfo {
        payment_qr_url,
        delivery_fee: state.config().delivery_fee,
    }))
}
