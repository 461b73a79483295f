//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use mercado_core::{OrderId, ProductId};

use crate::error::Result;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::{Order, PaymentResult, ShippingAddress};
use crate::services::OrderService;
use crate::services::orders::NewOrderItem;
use crate::state::AppState;

/// Place-order request body. Prices are ignored if sent; every line item is
/// re-priced from the catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// One requested line item.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductId,
    pub quantity: u32,
}

/// Payment confirmation as reported by the payment provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let items: Vec<NewOrderItem> = req
        .order_items
        .into_iter()
        .map(|item| NewOrderItem {
            product: item.product,
            quantity: item.quantity,
        })
        .collect();

    let order = OrderService::new(state.stores())
        .place_order(user.id, &items, req.shipping_address, req.payment_method)
        .await?;

    tracing::info!(order = %order.id, user = %user.id, total = %order.total_price, "order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders (admin)
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.stores()).list_all().await?;
    Ok(Json(orders))
}

/// GET /api/orders/myorders
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.stores()).list_own(user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.stores()).get_order(&user, id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/pay
pub async fn pay(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
    Json(req): Json<PayRequest>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.stores());
    // Ownership check first; only the purchaser (or an admin) may pay.
    service.get_order(&user, id).await?;

    let order = service
        .mark_paid(
            id,
            PaymentResult {
                id: req.id,
                status: req.status,
                update_time: req.update_time,
                email_address: req.email_address,
            },
        )
        .await?;

    tracing::info!(order = %order.id, "order marked paid");
    Ok(Json(order))
}

/// PUT /api/orders/{id}/deliver (admin)
pub async fn deliver(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.stores()).mark_delivered(id).await?;

    tracing::info!(order = %order.id, "order marked delivered");
    Ok(Json(order))
}
