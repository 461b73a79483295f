//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercado_core::{Price, ProductId, ReviewId, UserId};

/// A catalog product.
///
/// Stock is decremented as a side effect of order creation and must never
/// go negative; the workflow rejects any operation that would cause this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price, non-negative.
    pub price: Price,
    pub image_url: String,
    pub category: String,
    pub brand: String,
    /// Units available for sale.
    pub count_in_stock: u32,
    /// Aggregate review rating.
    pub rating: Decimal,
    pub num_reviews: u32,
    /// Embedded customer reviews.
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer review embedded in a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    /// Reviewing user.
    pub user: UserId,
    /// Reviewer display name, copied so the review survives account changes.
    pub name: String,
    pub rating: Decimal,
    pub comment: String,
}

impl Product {
    /// Create a new product with no reviews.
    #[must_use]
    pub fn new(
        name: String,
        description: String,
        price: Price,
        image_url: String,
        category: String,
        brand: String,
        count_in_stock: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name,
            description,
            price,
            image_url,
            category,
            brand,
            count_in_stock,
            rating: Decimal::ZERO,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `quantity` units can currently be sold.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: u32) -> bool {
        self.count_in_stock >= quantity
    }
}
