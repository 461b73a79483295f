//! Cart route handlers.
//!
//! The cart is keyed by the authenticated user; there is no guest cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use mercado_core::ProductId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::services::CartService;
use crate::services::cart::ResolvedCartItem;
use crate::state::AppState;

/// Set-quantity request body. Quantity 0 removes the entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ResolvedCartItem>>> {
    let items = CartService::new(state.stores()).get(user.id).await?;
    Ok(Json(items))
}

/// POST /api/cart
pub async fn set_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SetItemRequest>,
) -> Result<Json<Vec<ResolvedCartItem>>> {
    let items = CartService::new(state.stores())
        .set_item(user.id, req.product_id, req.quantity)
        .await?;
    Ok(Json(items))
}

/// DELETE /api/cart/{productId}
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<ResolvedCartItem>>> {
    let items = CartService::new(state.stores())
        .remove_item(user.id, product_id)
        .await?;
    Ok(Json(items))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode> {
    CartService::new(state.stores()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
