//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError, OrderError, UserAdminError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or profile operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Admin account management failed.
    #[error("Admin error: {0}")]
    Admin(#[from] UserAdminError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound | AuthError::AddressNotFound => StatusCode::NOT_FOUND,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::UserNotFound | CartError::ProductNotFound => StatusCode::NOT_FOUND,
                CartError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::Empty
                | OrderError::IncompleteShippingAddress
                | OrderError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                OrderError::ProductNotFound(_) | OrderError::NotFound => StatusCode::NOT_FOUND,
                OrderError::Forbidden => StatusCode::FORBIDDEN,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Admin(err) => match err {
                UserAdminError::NotFound => StatusCode::NOT_FOUND,
                UserAdminError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                UserAdminError::AlreadyExists => StatusCode::CONFLICT,
                UserAdminError::LastAdmin | UserAdminError::OwnAccount => StatusCode::FORBIDDEN,
                UserAdminError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn message(&self) -> String {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return "Internal server error".to_owned();
        }
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_owned(),
            Self::Auth(AuthError::InvalidToken) => "Not authorized, token failed".to_owned(),
            Self::Auth(err) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::Catalog(err) => err.to_string(),
            Self::Admin(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({ "message": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("Order".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("no token".to_owned()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("admins only".to_owned()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Order(OrderError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Admin(UserAdminError::LastAdmin).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Cart(CartError::InsufficientStock {
                name: "Balón".to_owned(),
                requested: 6,
                available: 5,
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_are_redacted() {
        let err = AppError::Internal("pool exhausted at 10.0.0.3".to_owned());
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Auth(AuthError::PasswordHash);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_detail() {
        let err = AppError::Cart(CartError::InsufficientStock {
            name: "Balón".to_owned(),
            requested: 6,
            available: 5,
        });
        assert!(err.message().contains("exceeds available stock"));
    }
}
