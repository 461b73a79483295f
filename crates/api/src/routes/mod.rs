//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Auth & profile
//! POST /api/auth/register          - Create an account
//! POST /api/auth/login             - Login with email + password
//! GET  /api/auth/profile           - Current account (requires auth)
//! PUT  /api/auth/profile           - Update account fields (requires auth)
//! POST /api/auth/profile/addresses       - Add a saved address
//! PUT  /api/auth/profile/addresses/{id}  - Replace a saved address
//! DELETE /api/auth/profile/addresses/{id} - Remove a saved address
//!
//! # Catalog
//! GET    /api/products             - Product listing
//! GET    /api/products/{id}        - Product detail
//! POST   /api/products             - Create product (admin)
//! PUT    /api/products/{id}        - Update product (admin)
//! DELETE /api/products/{id}        - Delete product (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                 - Resolved cart contents
//! POST   /api/cart                 - Set quantity for a product (0 removes)
//! DELETE /api/cart                 - Empty the cart
//! DELETE /api/cart/{productId}     - Remove one entry
//!
//! # Orders (requires auth)
//! POST /api/orders                 - Place an order
//! GET  /api/orders                 - All orders, newest first (admin)
//! GET  /api/orders/myorders        - Caller's orders
//! GET  /api/orders/{id}            - One order (owner or admin)
//! PUT  /api/orders/{id}/pay        - Mark paid (owner or admin)
//! PUT  /api/orders/{id}/deliver    - Mark delivered (admin)
//!
//! # Accounts (admin)
//! GET    /api/users                - All accounts
//! GET    /api/users/{id}           - One account
//! PUT    /api/users/{id}           - Update username/email/role
//! DELETE /api/users/{id}           - Delete an account
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::state::AppState;

/// Create the auth and profile routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/profile/addresses", post(auth::add_address))
        .route(
            "/profile/addresses/{id}",
            put(auth::update_address).delete(auth::delete_address),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::set_item).delete(cart::clear))
        .route("/{productId}", delete(cart::remove_item))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/myorders", get(orders::mine))
        .route("/{id}", get(orders::show))
        .route("/{id}/pay", put(orders::pay))
        .route("/{id}/deliver", put(orders::deliver))
}

/// Create the admin account-management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(users::index)).route(
        "/{id}",
        get(users::show).put(users::update).delete(users::destroy),
    )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/users", user_routes())
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
