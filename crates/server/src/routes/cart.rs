//! Cart route handlers.
//!
//! Authenticated users get a persisted cart row; anonymous visitors keep
//! theirs in the session until login adopts it. Handlers load, mutate via
//! the `Cart` type, and store back; totals are always derived on the way
//! out.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use mercado_core::ProductId;

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product, session_keys};
use crate::services::cart::Cart;
use crate::state::AppState;

/// Cart response with derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub total: Decimal,
    pub count: i32,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        let count = cart.count();
        Self { cart, total, count }
    }
}

async fn load_cart(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<Cart> {
    match user {
        Some(user) => Ok(CartRepository::new(state.pool()).get(user.id).await?),
        None => Ok(session
            .get(session_keys::ANON_CART)
            .await
            .map_err(|e| AppError::Internal(format!("session error: {e}")))?
            .unwrap_or_default()),
    }
}

async fn store_cart(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    cart: &Cart,
) -> Result<()> {
    match user {
        Some(user) => Ok(CartRepository::new(state.pool()).save(user.id, cart).await?),
        None => session
            .insert(session_keys::ANON_CART, cart)
            .await
            .map_err(|e| AppError::Internal(format!("session error: {e}"))),
    }
}

/// The current cart.
#[instrument(skip(state, session, user))]
pub async fn get_cart(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let cart = load_cart(&state, &session, user.as_ref()).await?;
    Ok(Json(CartView::from(cart)))
}

#[derive(Debug, Deserialize)]
pub struct AddItemPayload {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Add a product to the cart, clamped to its current stock.
#[instrument(skip(state, session, user))]
pub async fn add_item(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(payload): Json<AddItemPayload>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(payload.product_id)
        .await?
        .filter(Product::is_purchasable)
        .ok_or_else(|| AppError::NotFound(format!("product {}", payload.product_id)))?;

    let mut cart = load_cart(&state, &session, user.as_ref()).await?;
    cart.add_item(&product, payload.quantity);
    store_cart(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(cart)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemPayload {
    pub quantity: i32,
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, session, user))]
pub async fn update_item(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, &session, user.as_ref()).await?;
    cart.update_quantity(product_id, payload.quantity);
    store_cart(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(cart)))
}

/// Remove a line entirely.
#[instrument(skip(state, session, user))]
pub async fn remove_item(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, &session, user.as_ref()).await?;
    cart.remove_item(product_id);
    store_cart(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(cart)))
}

/// Empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear_cart(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let cart = Cart::new();
    store_cart(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(cart)))
}
