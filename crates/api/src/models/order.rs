//! Order domain types.
//!
//! An order holds an immutable snapshot of product data taken at creation
//! time. Later changes to a product's name or price do not affect historical
//! orders; this denormalization is deliberate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{OrderId, Price, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchasing user.
    pub user: UserId,
    /// Line-item snapshot.
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    /// Payment method label (e.g. "PayPal").
    pub payment_method: String,
    /// Sum of unit price times quantity over all line items.
    pub items_price: Price,
    /// Flat shipping fee: zero above the free-shipping threshold.
    pub shipping_price: Price,
    /// Tax on the items subtotal.
    pub tax_price: Price,
    /// `items_price + shipping_price + tax_price`.
    pub total_price: Price,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// Result record from the external payment provider, stored verbatim.
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A line item snapshotted from the catalog at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Reference back to the catalog product.
    pub product: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Product image at order time.
    pub image_url: String,
    pub quantity: u32,
    /// Authoritative unit price at order time.
    pub price: Price,
}

/// Shipping destination. All fields are required at order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Whether every required field is present and non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        ![
            &self.address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
    }
}

/// Opaque record returned by the payment provider.
///
/// The API records this verbatim; verifying payment authenticity is the
/// provider's job, not this layer's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_address_completeness() {
        let complete = ShippingAddress {
            address: "Av. Siempre Viva 742".to_owned(),
            city: "Springfield".to_owned(),
            state: "OR".to_owned(),
            postal_code: "97477".to_owned(),
            country: "US".to_owned(),
        };
        assert!(complete.is_complete());

        let blank_city = ShippingAddress {
            city: "  ".to_owned(),
            ..complete
        };
        assert!(!blank_city.is_complete());
    }
}
