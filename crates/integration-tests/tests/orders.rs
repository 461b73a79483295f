//! Order placement and state transitions through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use mercado_integration_tests::TestApp;

/// Monetary fields serialize as decimal strings; parse for comparison so
/// trailing zeros don't matter.
fn dec(value: &Value) -> Decimal {
    value.as_str().expect("decimal string").parse().unwrap()
}

fn shipping() -> Value {
    json!({
        "address": "Av. Siempre Viva 742",
        "city": "Springfield",
        "state": "OR",
        "postalCode": "97477",
        "country": "US",
    })
}

fn order_body(product: impl ToString, quantity: u32) -> Value {
    json!({
        "orderItems": [{ "product": product.to_string(), "quantity": quantity }],
        "shippingAddress": shipping(),
        "paymentMethod": "PayPal",
    })
}

#[tokio::test]
async fn test_checkout_totals_and_side_effects() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let product = app.seed_product("Balón", 1000, 5).await;

    // Item is in the cart before checkout
    app.post(
        "/api/cart",
        Some(&token),
        json!({ "productId": product, "quantity": 2 }),
    )
    .await;

    let (status, order) = app
        .post("/api/orders", Some(&token), order_body(product, 2))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");

    assert_eq!(dec(&order["itemsPrice"]), Decimal::from(20));
    assert_eq!(dec(&order["shippingPrice"]), Decimal::from(10));
    assert_eq!(dec(&order["taxPrice"]), Decimal::from(3));
    assert_eq!(dec(&order["totalPrice"]), Decimal::from(33));
    assert_eq!(order["isPaid"], false);
    assert_eq!(order["isDelivered"], false);

    // Items are snapshots priced from the catalog
    assert_eq!(order["orderItems"][0]["name"], "Balón");
    assert_eq!(dec(&order["orderItems"][0]["price"]), Decimal::from(10));

    // Stock decremented
    let (_, fetched) = app.get(&format!("/api/products/{product}"), None).await;
    assert_eq!(fetched["countInStock"], 3);

    // Cart emptied
    let (_, cart) = app.get("/api/cart", Some(&token)).await;
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_free_shipping_above_threshold() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let product = app.seed_product("Laptop", 10_100, 5).await; // 101.00

    let (status, order) = app
        .post("/api/orders", Some(&token), order_body(product, 1))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&order["shippingPrice"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_oversell_leaves_no_trace() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let product = app.seed_product("Balón", 1000, 5).await;

    let (status, body) = app
        .post("/api/orders", Some(&token), order_body(product, 10))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("insufficient"));

    // Stock untouched, no order recorded
    let (_, fetched) = app.get(&format!("/api/products/{product}"), None).await;
    assert_eq!(fetched["countInStock"], 5);

    let (_, mine) = app.get("/api/orders/myorders", Some(&token)).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_and_incomplete_requests_rejected() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let product = app.seed_product("Balón", 1000, 5).await;

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "orderItems": [],
                "shippingAddress": shipping(),
                "paymentMethod": "PayPal",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut incomplete = shipping();
    incomplete["postalCode"] = json!("");
    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "orderItems": [{ "product": product.to_string(), "quantity": 1 }],
                "shippingAddress": incomplete,
                "paymentMethod": "PayPal",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_visibility() {
    let app = TestApp::new();
    let owner = app.register("ana", "ana@example.com", "correcthorse").await;
    let stranger = app.register("eve", "eve@example.com", "correcthorse").await;
    let admin = app
        .register_admin("admin", "admin@example.com", "correcthorse")
        .await;
    let product = app.seed_product("Balón", 1000, 5).await;

    let (_, order) = app
        .post("/api/orders", Some(&owner), order_body(product, 1))
        .await;
    let id = order["id"].as_str().unwrap().to_owned();
    let path = format!("/api/orders/{id}");

    let (status, _) = app.get(&path, Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&path, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&path, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pay_and_deliver() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let admin = app
        .register_admin("admin", "admin@example.com", "correcthorse")
        .await;
    let product = app.seed_product("Balón", 1000, 5).await;

    let (_, order) = app
        .post("/api/orders", Some(&token), order_body(product, 1))
        .await;
    let id = order["id"].as_str().unwrap().to_owned();

    let (status, paid) = app
        .put(
            &format!("/api/orders/{id}/pay"),
            Some(&token),
            json!({
                "id": "PAY-123",
                "status": "COMPLETED",
                "emailAddress": "ana@example.com",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["isPaid"], true);
    assert!(paid["paidAt"].is_string());
    assert_eq!(paid["paymentResult"]["id"], "PAY-123");

    // Delivery is admin-only
    let (status, _) = app
        .put(&format!("/api/orders/{id}/deliver"), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, delivered) = app
        .put(&format!("/api/orders/{id}/deliver"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["isDelivered"], true);
    assert!(delivered["deliveredAt"].is_string());
}

#[tokio::test]
async fn test_admin_listing_newest_first() {
    let app = TestApp::new();
    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let admin = app
        .register_admin("admin", "admin@example.com", "correcthorse")
        .await;
    let product = app.seed_product("Balón", 1000, 50).await;

    for _ in 0..3 {
        app.post("/api/orders", Some(&token), order_body(product, 1))
            .await;
    }

    // Listing everyone's orders requires the admin role
    let (status, _) = app.get("/api/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, orders) = app.get("/api/orders", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 3);
    let created: Vec<&str> = orders
        .iter()
        .map(|o| o["createdAt"].as_str().unwrap())
        .collect();
    let mut sorted = created.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(created, sorted);
}
