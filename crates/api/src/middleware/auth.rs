//! Authentication extractors.
//!
//! Identity is carried as `Authorization: Bearer <token>`. The extractors
//! verify the token and load the account so handlers receive a full
//! [`User`]; a token whose account has since been deleted is rejected the
//! same way as an invalid one.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::token;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_owned()))?;

        let user_id = token::verify(token, &state.config().jwt_secret)
            .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_owned()))?;

        let user = state
            .stores()
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not authorized, token failed".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Not authorized as admin".to_owned()));
        }
        Ok(Self(user))
    }
}

/// Extract the token from an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(header::AUTHORIZATION, value)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let (parts, ()) = Request::builder().body(()).expect("request").into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
