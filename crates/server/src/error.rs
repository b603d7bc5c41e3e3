//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. The `IntoResponse`
//! impl decides three things in one place: which errors reach Sentry, which
//! status code the client sees, and how much detail the message leaks.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use mercado_core::lifecycle::{ReviewError, TransitionError};
use mercado_core::plus_code::PlusCodeError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::storage::StorageError;

/// Application-level error type for the marketplace API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Object storage upload failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Disallowed order status transition.
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Payment state change attempted on a terminal order.
    #[error("Payment review error: {0}")]
    Review(#[from] ReviewError),

    /// Invalid Plus Code in a delivery address.
    #[error("Invalid plus code: {0}")]
    PlusCode(#[from] PlusCodeError),

    /// Checkout validation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role or ownership.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// State conflict (duplicate slug, concurrent status change, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error indicates a fault on our side worth a Sentry event.
    ///
    /// Client-level outcomes carried by `RepositoryError` (missing rows,
    /// stale compare-and-set updates, slug collisions) stay out of Sentry.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Internal(_) | Self::Storage(_) => true,
            Self::Database(err) => !matches!(
                err,
                RepositoryError::NotFound
                    | RepositoryError::Stale(_)
                    | RepositoryError::Conflict(_)
            ),
            _ => false,
        }
    }

    /// Status code plus a client-safe message.
    ///
    /// Database and internal errors collapse to a generic message so query
    /// text and connection details never leave the server.
    fn client_view(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
                RepositoryError::Conflict(msg) | RepositoryError::Stale(msg) => {
                    (StatusCode::CONFLICT, msg.clone())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                ),
            },
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
            Self::Storage(_) => (
                StatusCode::BAD_GATEWAY,
                "Upload service unavailable".to_owned(),
            ),
            Self::Auth(err) => auth_client_view(err),
            Self::Transition(_) | Self::Review(_) | Self::Conflict(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Self::PlusCode(_) | Self::Checkout(_) | Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
        }
    }
}

fn auth_client_view(err: &AuthError) -> (StatusCode, String) {
    match err {
        // Same message for bad password and unknown email.
        AuthError::InvalidCredentials | AuthError::UserNotFound => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
        }
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "An account with this email already exists".to_owned(),
        ),
        AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_REQUEST, "Invalid email address".to_owned())
        }
        AuthError::InvalidSessionState => (
            StatusCode::UNAUTHORIZED,
            "Session expired, please try again".to_owned(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_owned(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message) = self.client_view();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the authenticated user to the Sentry scope so later errors in the
/// session carry it.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Detach the user from the Sentry scope on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_display_includes_detail() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_stale_update_maps_to_conflict() {
        let err = AppError::Database(RepositoryError::Stale("order status changed".to_string()));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_transition_error_maps_to_conflict() {
        use mercado_core::{Actor, OrderStatus};
        let err = AppError::Transition(TransitionError {
            actor: Actor::Buyer,
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        });
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_review_error_maps_to_conflict() {
        use mercado_core::OrderStatus;
        let err = AppError::Review(ReviewError {
            status: OrderStatus::Cancelled,
        });
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_client_conflicts_are_not_server_faults() {
        assert!(!AppError::Database(RepositoryError::Stale("x".into())).is_server_fault());
        assert!(!AppError::Database(RepositoryError::Conflict("x".into())).is_server_fault());
        assert!(!AppError::Database(RepositoryError::NotFound).is_server_fault());
        assert!(AppError::Internal("boom".into()).is_server_fault());
    }
}
