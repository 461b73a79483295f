//! Storage layer.
//!
//! Persistence is behind per-entity repository traits so the services stay
//! agnostic of the backend. Two implementations exist:
//!
//! - [`postgres::PgStore`] - one JSONB document table per entity, used in
//!   production. Queries are built at runtime so the workspace compiles
//!   without a live database.
//! - [`memory::MemoryStore`] - in-process maps, used by tests and as the
//!   dev fallback when no database URL is configured.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p mercado-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use mercado_core::{Email, OrderId, ProductId, UserId};

use crate::models::{Order, Product, User};

/// Errors surfaced by the repository traits.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The record being saved or deleted does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored document could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backend failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for user documents.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Insert a new user. Fails with `Conflict` on a duplicate email or
    /// username.
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    /// Replace an existing user document. Fails with `NotFound` if absent.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    /// Delete a user. Returns whether a record was removed.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;

    /// Number of accounts with the admin role.
    async fn count_admins(&self) -> Result<u64, RepositoryError>;
}

/// Repository for product documents.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Atomically decrement stock by `quantity` if at least that much is
    /// available. Returns `false` when stock was insufficient (nothing is
    /// changed in that case). This single conditional update is what keeps
    /// stock from going negative under concurrent checkouts.
    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError>;
}

/// Repository for order documents.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// All orders, newest first.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;
}

/// The three repositories bundled for handler access.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            users: store.clone(),
            products: store.clone(),
            orders: store,
        }
    }

    /// In-memory stores. State is lost on shutdown.
    #[must_use]
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            users: store.clone(),
            products: store.clone(),
            orders: store,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
