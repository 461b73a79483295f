//! Business services.
//!
//! Each service borrows the repositories it needs from [`crate::db::Stores`]
//! and owns one slice of the domain:
//!
//! - [`auth`] - registration, login, profile and address book
//! - [`cart`] - the embedded cart on a user document
//! - [`orders`] - checkout workflow and order state transitions
//! - [`catalog`] - product CRUD
//! - [`users`] - admin-only account management

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderService};
pub use users::{UserAdminError, UserAdminService};
