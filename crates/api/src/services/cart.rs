//! Cart service.
//!
//! The cart is an embedded list on the user document; this service layers
//! stock validation and product resolution on top of the pure list
//! operations in [`crate::models::User`].

use serde::Serialize;
use thiserror::Error;

use mercado_core::{Price, ProductId, UserId};

use crate::db::{ProductStore, RepositoryError, Stores, UserStore};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Product not found.
    #[error("product not found")]
    ProductNotFound,

    /// Requested quantity exceeds current stock.
    #[error("requested quantity ({requested}) exceeds available stock ({available}) for {name}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A cart entry with its product reference resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCartItem {
    pub product: CartProduct,
    pub quantity: u32,
}

/// Display projection of a product inside a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub count_in_stock: u32,
}

/// Cart service.
pub struct CartService<'a> {
    users: &'a dyn UserStore,
    products: &'a dyn ProductStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub fn new(stores: &'a Stores) -> Self {
        Self {
            users: stores.users.as_ref(),
            products: stores.products.as_ref(),
        }
    }

    /// The user's cart with product references resolved. Entries whose
    /// product has since been deleted are dropped from the view.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user doesn't exist.
    pub async fn get(&self, user_id: UserId) -> Result<Vec<ResolvedCartItem>, CartError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        let mut resolved = Vec::with_capacity(user.cart.len());
        for item in &user.cart {
            if let Some(product) = self.products.find_by_id(item.product).await? {
                resolved.push(ResolvedCartItem {
                    product: CartProduct {
                        id: product.id,
                        name: product.name,
                        price: product.price,
                        image_url: product.image_url,
                        count_in_stock: product.count_in_stock,
                    },
                    quantity: item.quantity,
                });
            }
        }
        Ok(resolved)
    }

    /// Set the cart quantity for a product.
    ///
    /// Quantity 0 removes the entry; otherwise the entry is inserted or
    /// replaced. A positive quantity must not exceed current stock.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` naming the requested and
    /// available amounts if the product cannot cover the quantity.
    pub async fn set_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Vec<ResolvedCartItem>, CartError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if quantity > 0 && !product.has_stock_for(quantity) {
            return Err(CartError::InsufficientStock {
                name: product.name,
                requested: quantity,
                available: product.count_in_stock,
            });
        }

        user.set_cart_item(product_id, quantity);
        user.updated_at = chrono::Utc::now();
        self.users.save(&user).await?;

        self.get(user_id).await
    }

    /// Remove a cart entry. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user doesn't exist.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<ResolvedCartItem>, CartError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        user.remove_cart_item(product_id);
        user.updated_at = chrono::Utc::now();
        self.users.save(&user).await?;

        self.get(user_id).await
    }

    /// Empty the cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user doesn't exist.
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        user.clear_cart();
        user.updated_at = chrono::Utc::now();
        self.users.save(&user).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mercado_core::Email;

    use super::*;
    use crate::models::{Product, User};

    async fn setup(stock: u32) -> (Stores, UserId, ProductId) {
        let stores = Stores::memory();
        let user = User::new(
            "ana".to_owned(),
            Email::parse("ana@example.com").unwrap(),
            "hash".to_owned(),
        );
        stores.users.create(&user).await.unwrap();

        let product = Product::new(
            "Balón de Fútbol".to_owned(),
            "Tamaño reglamentario".to_owned(),
            Price::from_major(36),
            "/images/balon.png".to_owned(),
            "Deportes".to_owned(),
            "Nike".to_owned(),
            stock,
        );
        stores.products.create(&product).await.unwrap();

        (stores, user.id, product.id)
    }

    #[tokio::test]
    async fn test_set_item_resolves_product() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        let items = cart.set_item(user_id, product_id, 2).await.unwrap();
        assert_eq!(items.len(), 1);
        let entry = items.first().unwrap();
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.product.name, "Balón de Fútbol");
        assert_eq!(entry.product.count_in_stock, 5);
    }

    #[tokio::test]
    async fn test_set_item_rejects_over_stock() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        let result = cart.set_item(user_id, product_id, 6).await;
        assert!(matches!(
            result,
            Err(CartError::InsufficientStock {
                requested: 6,
                available: 5,
                ..
            })
        ));

        // Nothing was stored
        assert!(cart.get(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_item_zero_removes() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        cart.set_item(user_id, product_id, 3).await.unwrap();
        let items = cart.set_item(user_id, product_id, 0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_set_item_unknown_product() {
        let (stores, user_id, _) = setup(5).await;
        let cart = CartService::new(&stores);

        let result = cart.set_item(user_id, ProductId::generate(), 1).await;
        assert!(matches!(result, Err(CartError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_remove_item_idempotent() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        cart.set_item(user_id, product_id, 1).await.unwrap();
        cart.remove_item(user_id, product_id).await.unwrap();
        let items = cart.remove_item(user_id, product_id).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_clear_idempotent() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        cart.set_item(user_id, product_id, 2).await.unwrap();
        cart.clear(user_id).await.unwrap();
        cart.clear(user_id).await.unwrap();
        assert!(cart.get(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_dropped_from_view() {
        let (stores, user_id, product_id) = setup(5).await;
        let cart = CartService::new(&stores);

        cart.set_item(user_id, product_id, 2).await.unwrap();
        stores.products.delete(product_id).await.unwrap();
        assert!(cart.get(user_id).await.unwrap().is_empty());
    }
}
