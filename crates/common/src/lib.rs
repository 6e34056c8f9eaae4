//! Shared types used across the storefront backend.

mod ids;
mod money;

pub use ids::{OrderId, OrderItemId, ProductId, UserId};
pub use money::Money;
