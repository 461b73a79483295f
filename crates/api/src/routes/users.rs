//! Admin account-management route handlers. All routes require the admin
//! role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use mercado_core::{Role, UserId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::auth::UserResponse;
use crate::services::UserAdminService;
use crate::services::users::AccountUpdate;
use crate::state::AppState;

/// Update-account request body. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// GET /api/users
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>> {
    let users = UserAdminService::new(state.stores()).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>> {
    let user = UserAdminService::new(state.stores()).get(id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let user = UserAdminService::new(state.stores())
        .update(
            id,
            AccountUpdate {
                username: req.username,
                email: req.email,
                role: req.role,
            },
        )
        .await?;

    tracing::info!(user = %user.id, admin = %admin.id, "account updated by admin");
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    UserAdminService::new(state.stores())
        .delete(admin.id, id)
        .await?;

    tracing::info!(user = %id, admin = %admin.id, "account deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
