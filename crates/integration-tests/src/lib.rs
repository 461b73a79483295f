//! Integration test harness for the Mercado API.
//!
//! Drives the full router in-process against the in-memory storage
//! backend, so every test exercises routing, extractors, services, and
//! error mapping without a running server or database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mercado-integration-tests
//! ```

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use mercado_api::config::ApiConfig;
use mercado_api::db::Stores;
use mercado_api::models::Product;
use mercado_api::routes;
use mercado_api::state::AppState;
use mercado_core::{Price, ProductId, Role};

/// Maximum response body size accepted by the harness.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// An in-process instance of the API over in-memory storage.
pub struct TestApp {
    router: Router,
    /// Direct repository access for seeding and assertions.
    pub stores: Stores,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh app with empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let config = ApiConfig {
            database_url: None,
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            jwt_secret: SecretString::from("iT9#qR2$vM6@xK4!wZ8%bN1&cJ5*hL3^"),
            sentry_dsn: None,
        };
        let stores = Stores::memory();
        let state = AppState::new(config, stores.clone());

        Self {
            router: routes::routes().with_state(state),
            stores,
        }
    }

    /// Send one request and return status plus decoded JSON body
    /// (`Value::Null` for empty bodies).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };

        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Register an account and return its bearer token.
    ///
    /// # Panics
    ///
    /// Panics if registration does not return 201 with a token.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        body["token"]
            .as_str()
            .expect("register response has no token")
            .to_owned()
    }

    /// Register an account, promote it to admin in storage, and log in
    /// again so the token maps to the admin role.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn register_admin(&self, username: &str, email: &str, password: &str) -> String {
        self.register(username, email, password).await;

        let parsed = mercado_core::Email::parse(email).expect("invalid email");
        let mut user = self
            .stores
            .users
            .find_by_email(&parsed)
            .await
            .expect("store error")
            .expect("user missing");
        user.role = Role::Admin;
        self.stores.users.save(&user).await.expect("store error");

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("no token").to_owned()
    }

    /// Insert a product directly into storage.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn seed_product(&self, name: &str, price_cents: i64, stock: u32) -> ProductId {
        let product = Product::new(
            name.to_owned(),
            format!("{name} (demo)"),
            Price::new(Decimal::new(price_cents, 2)).expect("negative price"),
            "/images/demo.png".to_owned(),
            "Demo".to_owned(),
            "Demo".to_owned(),
            stock,
        );
        self.stores
            .products
            .create(&product)
            .await
            .expect("store error");
        product.id
    }
}
