//! Domain layer for the storefront backend.
//!
//! Plain data types shared between the persistence and HTTP layers:
//! - `User` accounts
//! - `Product` catalog entries with stock and price
//! - `Order`, `OrderItem`, and the `OrderWithItems` read-side composite
//! - `OrderRequest` — the validated input to order placement

mod order;
mod product;
mod user;

pub use order::{
    ItemRequest, Order, OrderItem, OrderRequest, OrderRequestError, OrderStatus, OrderWithItems,
};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
