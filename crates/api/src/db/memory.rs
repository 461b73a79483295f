//! In-memory store.
//!
//! Backs tests and local development without a database. Each entity map
//! sits behind its own `RwLock`; `decrement_stock` runs under a single
//! write lock so the check and the decrement cannot interleave.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mercado_core::{Email, OrderId, ProductId, Role, UserId};

use super::{OrderStore, ProductStore, RepositoryError, UserStore};
use crate::models::{Order, Product, User};

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    products: RwLock<HashMap<ProductId, Product>>,
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepositoryError::Conflict(
                "username or email already exists".to_owned(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn count_admins(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == Role::Admin)
            .count() as u64)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(products)
    }

    async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(())
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(RepositoryError::NotFound);
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(false);
        };
        if product.count_in_stock < quantity {
            return Ok(false);
        }
        product.count_in_stock -= quantity;
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user == user)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orders)
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(RepositoryError::NotFound);
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }
}
