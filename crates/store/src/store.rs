//! Storage traits the rest of the system depends on.
//!
//! Two implementations exist: [`crate::PostgresStore`] for production and
//! [`crate::InMemoryStore`] for tests. Both provide the same observable
//! semantics, including the all-or-nothing order placement contract.

use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{NewProduct, NewUser, Order, OrderRequest, OrderWithItems, Product, User};

use crate::error::Result;

/// User account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user and returns the stored row.
    ///
    /// Fails with [`crate::StoreError::EmailTaken`] if the email is
    /// already registered.
    async fn create_user(&self, new: NewUser) -> Result<User>;

    /// Looks up a user by email. Absence is `Ok(None)`, not an error.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Looks up a user by ID.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>>;
}

/// Product catalog persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product and returns the stored row.
    async fn create_product(&self, new: NewProduct) -> Result<Product>;

    /// Looks up a product by ID.
    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists all products.
    async fn products(&self) -> Result<Vec<Product>>;

    /// Lists the products whose name matches exactly.
    async fn products_by_name(&self, name: &str) -> Result<Vec<Product>>;

    /// Replaces a product's fields, returning the updated row.
    ///
    /// Fails with [`crate::StoreError::ProductNotFound`] if absent.
    async fn update_product(&self, id: ProductId, update: NewProduct) -> Result<Product>;

    /// Deletes a product.
    ///
    /// Fails with [`crate::StoreError::ProductNotFound`] if absent, and
    /// with [`crate::StoreError::ProductInUse`] if any committed order
    /// item still references it.
    async fn delete_product(&self, id: ProductId) -> Result<()>;
}

/// Order placement and read paths.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically places an order: locks each referenced product, validates
    /// stock, snapshots prices, inserts the order and its items, and
    /// decrements inventory. Any failure leaves no trace.
    ///
    /// Products are locked in ascending product-id order regardless of
    /// request order, so two concurrent placements can never deadlock on
    /// each other's row locks.
    async fn place_order(&self, customer_id: UserId, request: OrderRequest) -> Result<Order>;

    /// Fetches an order with its items in insertion order.
    /// Absence is `Ok(None)`, not an error.
    async fn order_by_id(&self, id: OrderId) -> Result<Option<OrderWithItems>>;

    /// Fetches a customer's orders, most recent first, each with items.
    async fn orders_by_customer(&self, customer_id: UserId) -> Result<Vec<OrderWithItems>>;
}
