use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use domain::{
    NewProduct, NewUser, Order, OrderItem, OrderRequest, OrderRequestError, OrderStatus,
    OrderWithItems, Product, User,
};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::{OrderStore, ProductStore, UserStore};

/// In-memory store implementation for testing.
///
/// Provides the same interface and observable semantics as the PostgreSQL
/// implementation. A single lock over the whole store stands in for the
/// row-lock discipline: placements are validated fully before any
/// mutation, so a failed placement leaves no trace.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    next_user_id: i64,
    next_product_id: i64,
    next_order_id: i64,
    next_order_item_id: i64,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken(new.email));
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.next_user_id),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id.as_i64(), user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id.as_i64()).cloned())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let mut inner = self.inner.write().await;

        inner.next_product_id += 1;
        let product = Product {
            id: ProductId::new(inner.next_product_id),
            name: new.name,
            description: new.description,
            stock: new.stock,
            price: new.price,
        };
        inner.products.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.get(&id.as_i64()).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.values().cloned().collect())
    }

    async fn products_by_name(&self, name: &str) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }

    async fn update_product(&self, id: ProductId, update: NewProduct) -> Result<Product> {
        let mut inner = self.inner.write().await;

        let product = inner
            .products
            .get_mut(&id.as_i64())
            .ok_or(StoreError::ProductNotFound(id))?;
        product.name = update.name;
        product.description = update.description;
        product.stock = update.stock;
        product.price = update.price;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.products.contains_key(&id.as_i64()) {
            return Err(StoreError::ProductNotFound(id));
        }
        if inner.order_items.values().any(|item| item.product_id == id) {
            return Err(StoreError::ProductInUse(id));
        }
        inner.products.remove(&id.as_i64());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn place_order(&self, customer_id: UserId, request: OrderRequest) -> Result<Order> {
        let mut inner = self.inner.write().await;

        // Same aggregation and validation order as the Postgres store:
        // distinct products, ascending id.
        let mut requested: BTreeMap<ProductId, u32> = BTreeMap::new();
        for line in request.items() {
            let combined = requested.entry(line.product_id).or_default();
            *combined = combined.checked_add(line.quantity).ok_or(
                StoreError::InvalidRequest(OrderRequestError::QuantityOverflow {
                    product_id: line.product_id,
                }),
            )?;
        }

        let mut prices: BTreeMap<ProductId, Money> = BTreeMap::new();
        for (&product_id, &quantity) in &requested {
            let product = inner
                .products
                .get(&product_id.as_i64())
                .ok_or(StoreError::ProductNotFound(product_id))?;
            if product.stock < quantity {
                return Err(StoreError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: product.stock,
                });
            }
            prices.insert(product_id, product.price);
        }

        let total: Money = request
            .items()
            .iter()
            .map(|line| prices[&line.product_id].multiply(line.quantity))
            .sum();

        inner.next_order_id += 1;
        let order = Order {
            id: OrderId::new(inner.next_order_id),
            customer_id,
            total_price: total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        inner.orders.insert(order.id.as_i64(), order.clone());

        for line in request.items() {
            inner.next_order_item_id += 1;
            let item = OrderItem {
                id: OrderItemId::new(inner.next_order_item_id),
                order_id: order.id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: prices[&line.product_id],
            };
            inner.order_items.insert(item.id.as_i64(), item);
        }

        for (&product_id, &quantity) in &requested {
            if let Some(product) = inner.products.get_mut(&product_id.as_i64()) {
                product.stock -= quantity;
            }
        }

        Ok(order)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<OrderWithItems>> {
        let inner = self.inner.read().await;

        let Some(order) = inner.orders.get(&id.as_i64()).cloned() else {
            return Ok(None);
        };
        let items = inner
            .order_items
            .values()
            .filter(|item| item.order_id == id)
            .cloned()
            .collect();
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn orders_by_customer(&self, customer_id: UserId) -> Result<Vec<OrderWithItems>> {
        let inner = self.inner.read().await;

        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = inner
                    .order_items
                    .values()
                    .filter(|item| item.order_id == order.id)
                    .cloned()
                    .collect();
                OrderWithItems { order, items }
            })
            .collect())
    }
}
