use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of an order.
///
/// Orders are created as `Pending`. The later states exist in the schema
/// but no transition operations are exposed by this service yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    /// Returns the status as its database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "fulfilled" => Ok(OrderStatus::Fulfilled),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order header. Total and items are immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,

    /// Sum of `quantity * price` over the order's items, computed from
    /// product prices at the instant of the placement transaction.
    pub total_price: Money,

    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A single line of a committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,

    /// Unit price snapshotted at purchase time. Never recomputed from the
    /// product's current price.
    pub price: Money,
}

/// Read-side composite: an order plus its items in insertion order.
///
/// Never persisted as such; assembled on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One requested line of a new order: a product and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl ItemRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Validation failures for an order request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderRequestError {
    #[error("order has no items")]
    Empty,

    #[error("quantity for product {product_id} must be greater than 0")]
    ZeroQuantity { product_id: ProductId },

    #[error("combined quantity for product {product_id} exceeds the supported maximum")]
    QuantityOverflow { product_id: ProductId },
}

/// A validated, non-empty sequence of requested line items.
///
/// Construction enforces the input constraints of order placement: at
/// least one item, every quantity positive. Line order is preserved and
/// determines the insertion order of the resulting order items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    items: Vec<ItemRequest>,
}

impl OrderRequest {
    /// Validates the requested lines and builds a request.
    pub fn new(items: Vec<ItemRequest>) -> Result<Self, OrderRequestError> {
        if items.is_empty() {
            return Err(OrderRequestError::Empty);
        }
        for item in &items {
            if item.quantity == 0 {
                return Err(OrderRequestError::ZeroQuantity {
                    product_id: item.product_id,
                });
            }
        }
        Ok(Self { items })
    }

    /// The requested lines, in caller order.
    pub fn items(&self) -> &[ItemRequest] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Fulfilled,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown_labels() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn empty_request_is_rejected() {
        assert_eq!(OrderRequest::new(vec![]), Err(OrderRequestError::Empty));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = OrderRequest::new(vec![
            ItemRequest::new(ProductId::new(1), 2),
            ItemRequest::new(ProductId::new(2), 0),
        ]);
        assert_eq!(
            result,
            Err(OrderRequestError::ZeroQuantity {
                product_id: ProductId::new(2)
            })
        );
    }

    #[test]
    fn valid_request_preserves_line_order() {
        let request = OrderRequest::new(vec![
            ItemRequest::new(ProductId::new(9), 1),
            ItemRequest::new(ProductId::new(3), 4),
        ])
        .unwrap();
        let ids: Vec<i64> = request
            .items()
            .iter()
            .map(|i| i.product_id.as_i64())
            .collect();
        assert_eq!(ids, vec![9, 3]);
    }

    #[test]
    fn duplicate_products_are_allowed_at_request_level() {
        let request = OrderRequest::new(vec![
            ItemRequest::new(ProductId::new(1), 1),
            ItemRequest::new(ProductId::new(1), 2),
        ]);
        assert!(request.is_ok());
    }
}
