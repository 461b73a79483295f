//! Authentication and profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{AddressId, Role, UserId};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{Address, User};
use crate::services::AuthService;
use crate::services::auth::{AddressFields, ProfileUpdate};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request body. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Saved-address request body. All fields required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<AddressRequest> for AddressFields {
    fn from(req: AddressRequest) -> Self {
        Self {
            address: req.address,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email.into_inner(),
            role: user.role,
            addresses: user.addresses,
            created_at: user.created_at,
        }
    }
}

/// An account plus a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let (user, token) = auth.register(&req.username, &req.email, &req.password).await?;

    tracing::info!(user = %user.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let (user, token) = auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// GET /api/auth/profile
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let (user, token) = auth
        .update_profile(
            user.id,
            ProfileUpdate {
                username: req.username,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// POST /api/auth/profile/addresses
pub async fn add_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let user = auth.add_address(user.id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /api/auth/profile/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<AddressId>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let user = auth.update_address(user.id, address_id, req.into()).await?;

    Ok(Json(user.into()))
}

/// DELETE /api/auth/profile/addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<AddressId>,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.stores(), &state.config().jwt_secret);
    let user = auth.delete_address(user.id, address_id).await?;

    Ok(Json(user.into()))
}
