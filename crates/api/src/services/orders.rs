//! Order workflow.
//!
//! Checkout re-fetches every product and prices the order from catalog
//! data; client-supplied prices and names are ignored entirely. That
//! re-pricing is the workflow's main correctness safeguard and must not
//! be bypassed.

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use mercado_core::{OrderId, Price, ProductId, UserId};

use crate::db::{OrderStore, ProductStore, RepositoryError, Stores, UserStore};
use crate::models::{Order, OrderItem, PaymentResult, ShippingAddress, User};

/// Orders above this items subtotal ship free.
const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Flat shipping fee below the threshold, in whole currency units.
const FLAT_SHIPPING_FEE: u32 = 10;

/// Errors from the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request contained no line items.
    #[error("no order items")]
    Empty,

    /// A required shipping-address field is missing.
    #[error("missing required shipping address fields")]
    IncompleteShippingAddress,

    /// A referenced product no longer exists.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds current stock.
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    /// Order not found.
    #[error("order not found")]
    NotFound,

    /// Requester is neither the owner nor an admin.
    #[error("not authorized to view this order")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A requested line item. Only the reference and quantity are taken from
/// the client; everything else comes from the catalog.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product: ProductId,
    pub quantity: u32,
}

/// Order workflow service.
pub struct OrderService<'a> {
    users: &'a dyn UserStore,
    products: &'a dyn ProductStore,
    orders: &'a dyn OrderStore,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub fn new(stores: &'a Stores) -> Self {
        Self {
            users: stores.users.as_ref(),
            products: stores.products.as_ref(),
            orders: stores.orders.as_ref(),
        }
    }

    /// Place an order: validate, re-price from the catalog, persist the
    /// order, decrement stock, and clear the purchaser's cart.
    ///
    /// Every line item is validated against current stock before anything
    /// is persisted, so a rejected order leaves no trace. The stock
    /// decrement itself is an atomic decrement-if-sufficient per product;
    /// there is no compensating rollback across steps (an order that was
    /// persisted stays persisted even if a concurrent mutation starves a
    /// later decrement).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Empty` or `IncompleteShippingAddress` for a
    /// malformed request, `ProductNotFound` for a stale reference, and
    /// `InsufficientStock` naming the product and both quantities.
    pub async fn place_order(
        &self,
        user_id: UserId,
        items: &[NewOrderItem],
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> Result<Order, OrderError> {
        if items.is_empty() {
            return Err(OrderError::Empty);
        }
        if !shipping_address.is_complete() {
            return Err(OrderError::IncompleteShippingAddress);
        }

        // Re-fetch and validate every product before persisting anything.
        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .products
                .find_by_id(item.product)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product))?;

            if !product.has_stock_for(item.quantity) {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    requested: item.quantity,
                    available: product.count_in_stock,
                });
            }

            order_items.push(OrderItem {
                product: product.id,
                name: product.name,
                image_url: product.image_url,
                quantity: item.quantity,
                price: product.price,
            });
        }

        let (items_price, shipping_price, tax_price, total_price) = compute_totals(&order_items);

        let order = Order {
            id: OrderId::generate(),
            user: user_id,
            order_items,
            shipping_address,
            payment_method,
            items_price,
            shipping_price,
            tax_price,
            total_price,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        };

        self.orders.create(&order).await?;

        for item in &order.order_items {
            let decremented = self
                .products
                .decrement_stock(item.product, item.quantity)
                .await?;
            if !decremented {
                // Stock changed between validation and decrement (or the
                // product was deleted). The order stays recorded; flag the
                // discrepancy for operators.
                tracing::warn!(
                    order = %order.id,
                    product = %item.product,
                    quantity = item.quantity,
                    "stock decrement failed after order creation"
                );
            }
        }

        if let Some(mut user) = self.users.find_by_id(user_id).await? {
            user.clear_cart();
            user.updated_at = Utc::now();
            self.users.save(&user).await?;
        }

        Ok(order)
    }

    /// Fetch one order, visible to its owner or an admin only.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if absent and `OrderError::Forbidden`
    /// for anyone else's order.
    pub async fn get_order(&self, requester: &User, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.user != requester.id && !requester.role.is_admin() {
            return Err(OrderError::Forbidden);
        }
        Ok(order)
    }

    /// Orders placed by one user.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_own(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    /// All orders, newest first. Admin only; enforced at the route layer.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_all().await?)
    }

    /// Mark an order paid, recording the provider's result verbatim.
    /// One-way: a paid order stays paid.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if absent.
    pub async fn mark_paid(
        &self,
        order_id: OrderId,
        payment_result: PaymentResult,
    ) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        order.is_paid = true;
        order.paid_at = Some(Utc::now());
        order.payment_result = Some(payment_result);

        self.orders.save(&order).await?;
        Ok(order)
    }

    /// Mark an order delivered. One-way.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if absent.
    pub async fn mark_delivered(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        order.is_delivered = true;
        order.delivered_at = Some(Utc::now());

        self.orders.save(&order).await?;
        Ok(order)
    }
}

/// Server-side totals: items subtotal, flat shipping (free above the
/// threshold), 15% tax on items, and the grand total.
fn compute_totals(items: &[OrderItem]) -> (Price, Price, Price, Price) {
    let items_price: Price = items.iter().map(|i| i.price.times(i.quantity)).sum();

    let shipping_price = if items_price.amount() > FREE_SHIPPING_THRESHOLD {
        Price::ZERO
    } else {
        Price::from_major(FLAT_SHIPPING_FEE)
    };

    let tax_price = items_price.scale_by(Decimal::new(15, 2));
    let total_price = items_price + shipping_price + tax_price;

    (items_price, shipping_price, tax_price, total_price)
}
