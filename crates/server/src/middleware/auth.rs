//! Authentication middleware and extractors.
//!
//! Route handlers declare what they need: `RequireAuth` for any logged-in
//! user, or one of the role extractors (`RequireAdmin`, `RequireCourier`,
//! `RequireSeller`) for gated surfaces. Role checks read the capability set
//! resolved into the session at login; data-level ownership checks (own
//! order, own product, assigned delivery) stay in the handlers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use mercado_core::Actor;

use crate::models::{CurrentUser, session_keys};

/// Rejection for missing or insufficient authentication.
pub enum AuthRejection {
    /// Not logged in.
    Unauthorized,
    /// Logged in but lacking the named role.
    Forbidden(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication required" })),
            )
                .into_response(),
            Self::Forbidden(role) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": format!("{role} role required") })),
            )
                .into_response(),
        }
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("orders for {}", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident, $role:literal, $actor:expr) => {
        $(#[$doc])*
        pub struct $name(pub CurrentUser);

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = AuthRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                _state: &S,
            ) -> Result<Self, Self::Rejection> {
                let user = current_user(parts)
                    .await
                    .ok_or(AuthRejection::Unauthorized)?;
                if !user.roles.permits($actor) {
                    return Err(AuthRejection::Forbidden($role));
                }
                Ok(Self(user))
            }
        }
    };
}

role_extractor!(
    /// Requires acting as the admin.
    RequireAdmin,
    "admin",
    Actor::Admin
);
role_extractor!(
    /// Requires acting as a courier.
    RequireCourier,
    "delivery",
    Actor::Courier
);
role_extractor!(
    /// Requires acting as a seller.
    RequireSeller,
    "seller",
    Actor::Seller
);

/// Helper to set the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}
