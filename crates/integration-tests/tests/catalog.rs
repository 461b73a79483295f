//! Product catalog routes, including admin guards.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use mercado_integration_tests::TestApp;

fn camera() -> serde_json::Value {
    json!({
        "name": "Cámara Canon EOS",
        "description": "Réflex digital de 24 MP",
        "price": "929.00",
        "imageUrl": "/images/camara.png",
        "category": "Electrónica",
        "brand": "Canon",
        "countInStock": 7,
    })
}

#[tokio::test]
async fn test_listing_is_public() {
    let app = TestApp::new();
    let id = app.seed_product("Balón de Fútbol", 3599, 50).await;

    let (status, body) = app.get("/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Balón de Fútbol");
    assert_eq!(body["countInStock"], 50);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .get(
            "/api/products/00000000-0000-4000-8000-000000000000",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_admin() {
    let app = TestApp::new();

    let (status, _) = app.post("/api/products", None, camera()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.register("ana", "ana@example.com", "correcthorse").await;
    let (status, _) = app.post("/api/products", Some(&token), camera()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_crud() {
    let app = TestApp::new();
    let admin = app
        .register_admin("admin", "admin@example.com", "correcthorse")
        .await;

    let (status, created) = app.post("/api/products", Some(&admin), camera()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();

    // Partial update leaves other fields intact
    let (status, updated) = app
        .put(
            &format!("/api/products/{id}"),
            Some(&admin),
            json!({ "price": "899.00", "countInStock": 12 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], "899.00");
    assert_eq!(updated["countInStock"], 12);
    assert_eq!(updated["name"], "Cámara Canon EOS");

    let (status, _) = app.delete(&format!("/api/products/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let app = TestApp::new();
    let admin = app
        .register_admin("admin", "admin@example.com", "correcthorse")
        .await;

    let mut body = camera();
    body["price"] = json!("-1.00");
    let (status, response) = app.post("/api/products", Some(&admin), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "price must not be negative");
}
