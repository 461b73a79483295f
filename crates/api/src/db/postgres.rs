//! Postgres document store.
//!
//! Each entity lives in its own table as `(id UUID PRIMARY KEY, doc JSONB)`.
//! The `doc` column holds the camelCase serde form of the domain type, and
//! filters address fields with JSON operators (`doc->>'email'`). Uniqueness
//! of username/email is enforced by expression indexes in the migrations.
//!
//! Queries are built at runtime (`sqlx::query`) rather than with the
//! compile-time macros, so building the workspace needs no database.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::{Email, OrderId, ProductId, UserId};

use super::{OrderStore, ProductStore, RepositoryError, UserStore};
use crate::models::{Order, Product, User};

/// Postgres-backed implementation of all three repositories.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_doc<T: DeserializeOwned>(
        &self,
        query: &str,
        id: Uuid,
    ) -> Result<Option<T>, RepositoryError> {
        let doc: Option<serde_json::Value> = sqlx::query_scalar(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        doc.map(decode).transpose()
    }

    async fn fetch_docs<T: DeserializeOwned>(
        &self,
        query: &str,
    ) -> Result<Vec<T>, RepositoryError> {
        let docs: Vec<serde_json::Value> =
            sqlx::query_scalar(query).fetch_all(&self.pool).await?;
        docs.into_iter().map(decode).collect()
    }

    async fn insert_doc<T: Serialize>(
        &self,
        query: &str,
        id: Uuid,
        value: &T,
    ) -> Result<(), RepositoryError> {
        sqlx::query(query)
            .bind(id)
            .bind(encode(value)?)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("record already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;
        Ok(())
    }

    async fn update_doc<T: Serialize>(
        &self,
        query: &str,
        id: Uuid,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(query)
            .bind(id)
            .bind(encode(value)?)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_doc(&self, query: &str, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn decode<T: DeserializeOwned>(doc: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(doc)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid document: {e}")))
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable document: {e}")))
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_doc("SELECT doc FROM users WHERE id = $1", id.as_uuid())
            .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM users WHERE doc->>'email' = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM users WHERE doc->>'username' = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.fetch_docs("SELECT doc FROM users ORDER BY (doc->>'createdAt')::timestamptz ASC")
            .await
    }

    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        self.insert_doc(
            "INSERT INTO users (id, doc) VALUES ($1, $2)",
            user.id.as_uuid(),
            user,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                RepositoryError::Conflict("username or email already exists".to_owned())
            }
            other => other,
        })
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.update_doc(
            "UPDATE users SET doc = $2 WHERE id = $1",
            user.id.as_uuid(),
            user,
        )
        .await
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        self.delete_doc("DELETE FROM users WHERE id = $1", id.as_uuid())
            .await
    }

    async fn count_admins(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE doc->>'role' = 'admin'")
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.fetch_doc("SELECT doc FROM products WHERE id = $1", id.as_uuid())
            .await
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_docs("SELECT doc FROM products ORDER BY (doc->>'createdAt')::timestamptz ASC")
            .await
    }

    async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        self.insert_doc(
            "INSERT INTO products (id, doc) VALUES ($1, $2)",
            product.id.as_uuid(),
            product,
        )
        .await
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        self.update_doc(
            "UPDATE products SET doc = $2 WHERE id = $1",
            product.id.as_uuid(),
            product,
        )
        .await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        self.delete_doc("DELETE FROM products WHERE id = $1", id.as_uuid())
            .await
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        // Single conditional update: the stock check and the decrement are
        // one statement, so two concurrent checkouts cannot both pass on
        // the same last units.
        let result = sqlx::query(
            r"
            UPDATE products
            SET doc = jsonb_set(
                doc,
                '{countInStock}',
                to_jsonb((doc->>'countInStock')::bigint - $2)
            )
            WHERE id = $1 AND (doc->>'countInStock')::bigint >= $2
            ",
        )
        .bind(id.as_uuid())
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.fetch_doc("SELECT doc FROM orders WHERE id = $1", id.as_uuid())
            .await
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let docs: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT doc FROM orders WHERE doc->>'user' = $1 \
             ORDER BY (doc->>'createdAt')::timestamptz ASC",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await?;
        docs.into_iter().map(decode).collect()
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.fetch_docs("SELECT doc FROM orders ORDER BY (doc->>'createdAt')::timestamptz DESC")
            .await
    }

    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.insert_doc(
            "INSERT INTO orders (id, doc) VALUES ($1, $2)",
            order.id.as_uuid(),
            order,
        )
        .await
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        self.update_doc(
            "UPDATE orders SET doc = $2 WHERE id = $1",
            order.id.as_uuid(),
            order,
        )
        .await
    }
}
