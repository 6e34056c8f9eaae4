use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use domain::{
    NewProduct, NewUser, Order, OrderItem, OrderRequest, OrderRequestError, OrderStatus,
    OrderWithItems, Product, User,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{Result, StoreError};
use crate::ledger;
use crate::store::{OrderStore, ProductStore, UserStore};

/// PostgreSQL-backed store implementation.
///
/// Owns a connection pool; every order placement runs in its own
/// transaction on a pooled connection.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let stock: i32 = row.try_get("stock")?;
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            stock: stock as u32,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Transaction(sqlx::Error::Decode(e.into())))?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            customer_id: UserId::new(row.try_get("customer_id")?),
            total_price: Money::from_cents(row.try_get("total_cents")?),
            status,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(OrderItem {
            id: OrderItemId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: quantity as u32,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }

    /// Fetches the items for one order, in insertion order.
    async fn items_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, price_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order_item).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, new: NewUser) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, first_name, last_name, role,
                      created_at, updated_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Surface the unique-email violation as a business error
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("users_email_key")
            {
                return StoreError::EmailTaken(new.email.clone());
            }
            StoreError::Transaction(e)
        })?;

        Self::row_to_user(row)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, description, stock, price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, stock, price_cents
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.stock as i32)
        .bind(new.price.cents())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, description, stock, price_cents FROM products WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, stock, price_cents FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn products_by_name(&self, name: &str) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, stock, price_cents
            FROM products
            WHERE name = $1
            ORDER BY id ASC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn update_product(&self, id: ProductId, update: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, stock = $3, price_cents = $4
            WHERE id = $5
            RETURNING id, name, description, stock, price_cents
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.stock as i32)
        .bind(update.price.cents())
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::ProductNotFound(id))?;

        Self::row_to_product(row)
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // order_items keeps a plain (non-cascading) FK to products
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return StoreError::ProductInUse(id);
                }
                StoreError::Transaction(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, request), fields(customer_id = %customer_id))]
    async fn place_order(&self, customer_id: UserId, request: OrderRequest) -> Result<Order> {
        let start = Instant::now();
        metrics::counter!("order_placements_total").increment(1);

        // Aggregate duplicate lines per product: one lock, one stock
        // check, one decrement per distinct product. The BTreeMap gives
        // ascending product-id iteration, the canonical lock order.
        let mut requested: BTreeMap<ProductId, u32> = BTreeMap::new();
        for line in request.items() {
            let combined = requested.entry(line.product_id).or_default();
            *combined = combined.checked_add(line.quantity).ok_or(
                StoreError::InvalidRequest(OrderRequestError::QuantityOverflow {
                    product_id: line.product_id,
                }),
            )?;
        }

        let mut tx = self.pool.begin().await?;

        let mut prices: BTreeMap<ProductId, Money> = BTreeMap::new();
        for (&product_id, &quantity) in &requested {
            let (stock, price) = ledger::lock_and_fetch(&mut *tx, product_id).await?;
            if stock < quantity {
                // Dropping `tx` rolls back; no lock or tentative write survives
                metrics::counter!("order_placements_rejected_total").increment(1);
                return Err(StoreError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: stock,
                });
            }
            prices.insert(product_id, price);
        }

        // All lines validated under their row locks; totals come from the
        // snapshot prices, never from a re-read.
        let total: Money = request
            .items()
            .iter()
            .map(|line| prices[&line.product_id].multiply(line.quantity))
            .sum();

        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, total_cents, status)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, total_cents, status, created_at
            "#,
        )
        .bind(customer_id.as_i64())
        .bind(total.cents())
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let order = Self::row_to_order(&row)?;

        for line in request.items() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(line.quantity as i32)
            .bind(prices[&line.product_id].cents())
            .execute(&mut *tx)
            .await?;
        }

        for (&product_id, &quantity) in &requested {
            ledger::decrement(&mut *tx, product_id, quantity).await?;
        }

        tx.commit().await?;

        metrics::histogram!("order_placement_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total_price, "order placed");

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn order_by_id(&self, id: OrderId) -> Result<Option<OrderWithItems>> {
        let row = sqlx::query(
            "SELECT id, customer_id, total_cents, status, created_at FROM orders WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = Self::row_to_order(&row)?;
        let items = self.items_for_order(order.id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    #[tracing::instrument(skip(self))]
    async fn orders_by_customer(&self, customer_id: UserId) -> Result<Vec<OrderWithItems>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, total_cents, status, created_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = Self::row_to_order(&row)?;
            let items = self.items_for_order(order.id).await?;
            orders.push(OrderWithItems { order, items });
        }
        Ok(orders)
    }
}
