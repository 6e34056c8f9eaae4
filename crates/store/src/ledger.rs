//! Inventory ledger: the authoritative source of per-product stock and
//! price, with concurrency-safe read-and-decrement.
//!
//! Both operations run on a borrowed connection belonging to the caller's
//! open transaction. Locks and tentative writes become visible to other
//! transactions only on commit and are fully discarded on abort.

use common::{Money, ProductId};
use sqlx::{PgConnection, Row};

use crate::error::{Result, StoreError};

/// Locks a product row for the duration of the active transaction and
/// returns its current stock and unit price.
///
/// Blocks if another transaction holds the lock on the same row, until
/// that transaction ends. Fails with [`StoreError::ProductNotFound`] if
/// no such product exists.
pub async fn lock_and_fetch(conn: &mut PgConnection, product_id: ProductId) -> Result<(u32, Money)> {
    let row = sqlx::query("SELECT stock, price_cents FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id.as_i64())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::ProductNotFound(product_id))?;

    let stock: i32 = row.try_get("stock")?;
    let price_cents: i64 = row.try_get("price_cents")?;

    // stock >= 0 is a schema CHECK constraint
    Ok((stock as u32, Money::from_cents(price_cents)))
}

/// Reduces a product's stock by `quantity` within the caller's transaction.
///
/// The caller must have already validated `quantity <= stock` under the
/// row lock; validation lives in the coordinator so aggregate errors can
/// be reported before any mutation.
pub async fn decrement(conn: &mut PgConnection, product_id: ProductId, quantity: u32) -> Result<()> {
    sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
        .bind(quantity as i32)
        .bind(product_id.as_i64())
        .execute(&mut *conn)
        .await?;

    Ok(())
}
