//! User domain types.
//!
//! A user owns its embedded address book and cart: no other entity
//! references those records, and they live and die with the user document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{AddressId, Email, ProductId, Role, UserId};

/// A shop account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name, globally unique.
    pub username: String,
    /// Email address, globally unique.
    pub email: Email,
    /// Argon2 password hash. Never serialized to API responses; response
    /// projections are built explicitly in the route layer.
    pub password_hash: String,
    /// Authorization role.
    pub role: Role,
    /// Saved shipping addresses.
    pub addresses: Vec<Address>,
    /// Cart entries, at most one per product, quantity always >= 1.
    pub cart: Vec<CartItem>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A saved shipping address, identified within its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A (product, quantity) pair in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: ProductId,
    pub quantity: u32,
}

impl User {
    /// Create a new account with an empty address book and cart.
    #[must_use]
    pub fn new(username: String, email: Email, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            username,
            email,
            password_hash,
            role: Role::default(),
            addresses: Vec::new(),
            cart: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the cart quantity for a product.
    ///
    /// Quantity 0 removes the entry; the cart never stores zero-quantity
    /// items. An existing entry is replaced, otherwise a new one is appended.
    pub fn set_cart_item(&mut self, product: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_cart_item(product);
            return;
        }

        match self.cart.iter_mut().find(|item| item.product == product) {
            Some(item) => item.quantity = quantity,
            None => self.cart.push(CartItem { product, quantity }),
        }
    }

    /// Remove a cart entry. Idempotent: an absent entry is not an error.
    pub fn remove_cart_item(&mut self, product: ProductId) {
        self.cart.retain(|item| item.product != product);
    }

    /// Empty the cart unconditionally.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Look up a saved address by its local ID.
    #[must_use]
    pub fn address(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    /// Mutable lookup of a saved address by its local ID.
    pub fn address_mut(&mut self, id: AddressId) -> Option<&mut Address> {
        self.addresses.iter_mut().find(|a| a.id == id)
    }

    /// Remove a saved address. Returns whether an entry was removed.
    pub fn remove_address(&mut self, id: AddressId) -> bool {
        let before = self.addresses.len();
        self.addresses.retain(|a| a.id != id);
        self.addresses.len() != before
    }
}
