//! Domain types.
//!
//! These are the persisted document shapes. They serialize with camelCase
//! field names, which is also the wire format stored in the JSONB `doc`
//! column by the Postgres backend. HTTP request/response projections live
//! next to their handlers in [`crate::routes`].

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, PaymentResult, ShippingAddress};
pub use product::{Product, Review};
pub use user::{Address, CartItem, User};
