//! Courier route handlers.
//!
//! Couriers only see orders assigned to them and may only advance the
//! confirmed -> shipped -> delivered chain.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use mercado_core::lifecycle::check_transition;
use mercado_core::{Actor, OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireCourier;
use crate::models::OrderWithItems;
use crate::state::AppState;

/// Orders assigned to the caller, newest first.
#[instrument(skip(state, user), fields(courier_id = %user.id))]
pub async fn list_assigned(
    State(state): State<AppState>,
    RequireCourier(user): RequireCourier,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_courier(user.id)
        .await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
}

/// Advance an assigned order's lifecycle status.
#[instrument(skip(state, user), fields(courier_id = %user.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireCourier(user): RequireCourier,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<OrderWithItems>> {
    let repo = OrderRepository::new(state.pool());
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    // Assignment check comes before the transition table.
    if current.order.delivery_id != Some(user.id) {
        return Err(AppError::Forbidden(
            "order is not assigned to you".to_owned(),
        ));
    }

    check_transition(Actor::Courier, current.order.status, payload.status)?;
    repo.update_status(id, current.order.status, payload.status)
        .await?;

    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    tracing::info!(
        order = %order.order.reference(),
        status = %order.order.status,
        "order status updated by courier"
    );
    Ok(Json(order))
}
