use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product with its current stock level and unit price.
///
/// `stock` and `price` are authoritative only inside an order placement
/// transaction, where the row is read under a lock. Outside of one they
/// are a point-in-time view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,

    /// Units on hand. Never negative.
    pub stock: u32,

    /// Current unit price. Orders snapshot this at purchase time.
    pub price: Money,
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub stock: u32,
    pub price: Money,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        stock: u32,
        price: Money,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stock,
            price,
        }
    }
}
