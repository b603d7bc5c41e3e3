//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::carts::CartRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Profile, session_keys};
use crate::services::auth::AuthService;
use crate::services::cart::Cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Create an account and start a session.
#[instrument(skip(state, session, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let profile = auth
        .register(&payload.email, &payload.full_name, &payload.password)
        .await?;

    start_session(&session, &profile).await?;
    tracing::info!(profile_id = %profile.id, "account registered");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Login with email and password.
///
/// An anonymous session cart, if any, is merged into the user's persisted
/// cart and removed from the session.
#[instrument(skip(state, session, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Profile>> {
    let auth = AuthService::new(state.pool());
    let profile = auth.login(&payload.email, &payload.password).await?;

    start_session(&session, &profile).await?;
    adopt_anonymous_cart(&state, &session, &profile).await?;

    Ok(Json(profile))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}

/// The current session's user.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

async fn start_session(session: &Session, profile: &Profile) -> Result<()> {
    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    let user = CurrentUser {
        id: profile.id,
        email: profile.email.clone(),
        roles: profile.roles,
    };
    set_current_user(session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&profile.id, Some(profile.email.as_str()));

    Ok(())
}

async fn adopt_anonymous_cart(
    state: &AppState,
    session: &Session,
    profile: &Profile,
) -> Result<()> {
    let anon: Option<Cart> = session
        .remove(session_keys::ANON_CART)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    let Some(anon) = anon else {
        return Ok(());
    };
    if anon.is_empty() {
        return Ok(());
    }

    let carts = CartRepository::new(state.pool());
    let mut cart = carts.get(profile.id).await?;
    cart.merge(anon);
    carts.save(profile.id, &cart).await?;

    Ok(())
}
