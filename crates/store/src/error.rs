use common::ProductId;
use domain::OrderRequestError;
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product's stock cannot cover the requested quantity.
    /// Reported against the stock observed at lock time; nothing from the
    /// failed placement is committed.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product is still referenced by committed order items and
    /// cannot be deleted.
    #[error("product {0} is referenced by existing orders")]
    ProductInUse(ProductId),

    /// The order request failed input validation.
    #[error("invalid order request: {0}")]
    InvalidRequest(#[from] OrderRequestError),

    /// A referenced user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// A database-level failure: lock timeout, constraint violation,
    /// lost connection. The enclosing transaction is rolled back.
    #[error("transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
