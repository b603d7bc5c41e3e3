//! Own-profile route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use mercado_core::plus_code::PlusCode;

use crate::db::profiles::{ProfileRepository, ProfileUpdate};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Profile;
use crate::state::AppState;

/// The caller's profile.
#[instrument(skip(state, user), fields(profile_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_owned()))?;

    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_code: Option<String>,
    pub avatar_url: Option<String>,
    pub shop_name: Option<String>,
    pub shop_description: Option<String>,
    pub shop_logo_url: Option<String>,
}

/// Update the caller's profile. Absent fields keep their current values.
#[instrument(skip(state, user, payload), fields(profile_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<UpdatePayload>,
) -> Result<Json<Profile>> {
    // Geocodes are validated and stored normalized.
    let address_code = match payload.address_code.as_deref().map(str::trim) {
        None => None,
        Some("") => None,
        Some(raw) => Some(PlusCode::parse(raw)?.as_str().to_owned()),
    };

    let update = ProfileUpdate {
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
        address_code,
        avatar_url: payload.avatar_url,
        shop_name: payload.shop_name,
        shop_description: payload.shop_description,
        shop_logo_url: payload.shop_logo_url,
    };

    let profile = ProfileRepository::new(state.pool())
        .update(user.id, &update)
        .await?;

    Ok(Json(profile))
}
