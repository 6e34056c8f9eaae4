use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from a raw database key.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw database key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type! {
    /// Unique identifier for a registered user.
    ///
    /// Wraps the `BIGSERIAL` key to prevent mixing up user IDs with
    /// other integer-based identifiers.
    UserId
}

id_type! {
    /// Unique identifier for a product.
    ProductId
}

id_type! {
    /// Unique identifier for an order.
    OrderId
}

id_type! {
    /// Unique identifier for a single order line item.
    OrderItemId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_preserves_raw_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(ProductId::new(1) < ProductId::new(2));
    }

    #[test]
    fn id_serialization_is_transparent() {
        let id = OrderId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_display_matches_raw_value() {
        assert_eq!(UserId::new(99).to_string(), "99");
    }
}
