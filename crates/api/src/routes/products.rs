//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use mercado_core::{Price, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::CatalogService;
use crate::services::catalog::{NewProduct, ProductUpdate};
use crate::state::AppState;

/// Create-product request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: String,
    pub brand: String,
    pub count_in_stock: u32,
}

/// Update-product request body. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub count_in_stock: Option<u32>,
}

/// Prices come off the wire as plain decimals; negative values never make
/// it past this point.
fn parse_price(amount: Decimal) -> Result<Price> {
    Price::new(amount).ok_or_else(|| AppError::BadRequest("price must not be negative".to_owned()))
}

/// GET /api/products
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.stores()).list().await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogService::new(state.stores()).get(id).await?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let product = CatalogService::new(state.stores())
        .create(NewProduct {
            name: req.name,
            description: req.description,
            price: parse_price(req.price)?,
            image_url: req.image_url,
            category: req.category,
            brand: req.brand,
            count_in_stock: req.count_in_stock,
        })
        .await?;

    tracing::info!(product = %product.id, admin = %admin.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let price = req.price.map(parse_price).transpose()?;
    let product = CatalogService::new(state.stores())
        .update(
            id,
            ProductUpdate {
                name: req.name,
                description: req.description,
                price,
                image_url: req.image_url,
                category: req.category,
                brand: req.brand,
                count_in_stock: req.count_in_stock,
            },
        )
        .await?;

    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    CatalogService::new(state.stores()).delete(id).await?;

    tracing::info!(product = %id, admin = %admin.id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
