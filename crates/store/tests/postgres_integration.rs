//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{Money, OrderId, ProductId, UserId};
use domain::{ItemRequest, NewProduct, NewUser, OrderRequest, OrderStatus};
use sqlx::PgPool;
use store::{OrderStore, PostgresStore, ProductStore, StoreError, UserStore};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Apply the schema once through a temporary pool
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_items, orders, products, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed_customer(store: &PostgresStore) -> UserId {
    store
        .create_user(NewUser::new("customer@example.com", "hash", "Ada", "Lovelace"))
        .await
        .unwrap()
        .id
}

async fn seed_product(store: &PostgresStore, name: &str, stock: u32, price_cents: i64) -> ProductId {
    store
        .create_product(NewProduct::new(name, "", stock, Money::from_cents(price_cents)))
        .await
        .unwrap()
        .id
}

fn request(lines: Vec<(ProductId, u32)>) -> OrderRequest {
    OrderRequest::new(
        lines
            .into_iter()
            .map(|(id, qty)| ItemRequest::new(id, qty))
            .collect(),
    )
    .unwrap()
}

#[tokio::test]
async fn place_order_commits_header_items_and_stock() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 10, 1000).await;
    let gadget = seed_product(&store, "Gadget", 4, 250).await;

    let order = store
        .place_order(customer, request(vec![(widget, 2), (gadget, 3)]))
        .await
        .unwrap();

    assert_eq!(order.customer_id, customer);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price.cents(), 2 * 1000 + 3 * 250);

    let fetched = store.order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.order, order);
    assert_eq!(fetched.items.len(), 2);
    // Items come back in insertion (request) order with snapshot prices
    assert_eq!(fetched.items[0].product_id, widget);
    assert_eq!(fetched.items[0].quantity, 2);
    assert_eq!(fetched.items[0].price.cents(), 1000);
    assert_eq!(fetched.items[1].product_id, gadget);

    // Total equals the sum of item extensions
    let sum: Money = fetched
        .items
        .iter()
        .map(|i| i.price.multiply(i.quantity))
        .sum();
    assert_eq!(fetched.order.total_price, sum);

    // Stock decremented
    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 8);
    assert_eq!(store.product_by_id(gadget).await.unwrap().unwrap().stock, 1);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 5, 1000).await;

    let err = store
        .place_order(customer, request(vec![(widget, 6)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InsufficientStock {
            requested: 6,
            available: 5,
            ..
        }
    ));

    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 5);
    assert!(store.orders_by_customer(customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn multi_item_failure_rolls_back_all_lines() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 10, 1000).await;
    let gadget = seed_product(&store, "Gadget", 1, 250).await;

    // First line would fit, second doesn't; nothing may persist
    let err = store
        .place_order(customer, request(vec![(widget, 2), (gadget, 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { .. }));

    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 10);
    assert_eq!(store.product_by_id(gadget).await.unwrap().unwrap().stock, 1);
    assert!(store.orders_by_customer(customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_aborts_placement() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 10, 1000).await;

    let missing = ProductId::new(9999);
    let err = store
        .place_order(customer, request(vec![(widget, 1), (missing, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ProductNotFound(id) if id == missing));

    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 10);
}

#[tokio::test]
async fn concurrent_placements_settle_exactly_one_winner() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 5, 1000).await;

    let a = store.clone();
    let b = store.clone();
    let req_a = request(vec![(widget, 3)]);
    let req_b = request(vec![(widget, 3)]);

    let (res_a, res_b) = tokio::join!(
        tokio::spawn(async move { a.place_order(customer, req_a).await }),
        tokio::spawn(async move { b.place_order(customer, req_b).await }),
    );
    let results = [res_a.unwrap(), res_b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let stock_failures = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::InsufficientStock { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(stock_failures, 1);

    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 2);
    assert_eq!(store.orders_by_customer(customer).await.unwrap().len(), 1);
}

#[tokio::test]
async fn snapshot_price_is_fixed_at_purchase_time() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 10, 1000).await;

    let order = store
        .place_order(customer, request(vec![(widget, 1)]))
        .await
        .unwrap();

    store
        .update_product(
            widget,
            NewProduct::new("Widget", "", 9, Money::from_cents(9999)),
        )
        .await
        .unwrap();

    let fetched = store.order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.items[0].price.cents(), 1000);
    assert_eq!(fetched.order.total_price.cents(), 1000);
}

#[tokio::test]
async fn duplicate_lines_share_one_decrement_per_product() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 5, 100).await;

    let order = store
        .place_order(customer, request(vec![(widget, 2), (widget, 3)]))
        .await
        .unwrap();

    let fetched = store.order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.items.len(), 2);
    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 0);

    // Combined quantity beyond stock is rejected up front
    let err = store
        .place_order(customer, request(vec![(widget, 1), (widget, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { requested: 2, .. }));
}

#[tokio::test]
async fn order_by_id_absent_is_none() {
    let store = get_test_store().await;
    assert!(store
        .order_by_id(OrderId::new(12345))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn repeated_reads_return_identical_data() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 10, 100).await;

    let order = store
        .place_order(customer, request(vec![(widget, 2)]))
        .await
        .unwrap();

    let a = store.order_by_id(order.id).await.unwrap().unwrap();
    let b = store.order_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn orders_by_customer_most_recent_first() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let other = store
        .create_user(NewUser::new("other@example.com", "hash", "Alan", "Turing"))
        .await
        .unwrap()
        .id;
    let widget = seed_product(&store, "Widget", 10, 100).await;

    let first = store
        .place_order(customer, request(vec![(widget, 1)]))
        .await
        .unwrap();
    let second = store
        .place_order(customer, request(vec![(widget, 1)]))
        .await
        .unwrap();
    store
        .place_order(other, request(vec![(widget, 1)]))
        .await
        .unwrap();

    let orders = store.orders_by_customer(customer).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].order.id, second.id);
    assert_eq!(orders[1].order.id, first.id);
}

#[tokio::test]
async fn create_user_enforces_unique_email() {
    let store = get_test_store().await;
    seed_customer(&store).await;

    let err = store
        .create_user(NewUser::new("customer@example.com", "hash2", "Eve", "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EmailTaken(email) if email == "customer@example.com"));
}

#[tokio::test]
async fn user_lookup_round_trips() {
    let store = get_test_store().await;
    let id = seed_customer(&store).await;

    let by_id = store.user_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "customer@example.com");
    assert_eq!(by_id.role, "user");

    let by_email = store
        .user_by_email("customer@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, id);

    assert!(store
        .user_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn products_by_name_matches_exactly() {
    let store = get_test_store().await;
    seed_product(&store, "Widget", 1, 100).await;
    seed_product(&store, "Widget", 2, 200).await;
    seed_product(&store, "Gadget", 3, 300).await;

    let widgets = store.products_by_name("Widget").await.unwrap();
    assert_eq!(widgets.len(), 2);
    assert!(widgets.iter().all(|p| p.name == "Widget"));
    assert!(store.products_by_name("widget").await.unwrap().is_empty());
}

#[tokio::test]
async fn combined_quantity_overflow_is_invalid_request() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 5, 100).await;

    let err = store
        .place_order(customer, request(vec![(widget, u32::MAX), (widget, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRequest(domain::OrderRequestError::QuantityOverflow { product_id })
            if product_id == widget
    ));

    assert_eq!(store.product_by_id(widget).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
async fn ordered_product_cannot_be_deleted() {
    let store = get_test_store().await;
    let customer = seed_customer(&store).await;
    let widget = seed_product(&store, "Widget", 5, 100).await;

    store
        .place_order(customer, request(vec![(widget, 1)]))
        .await
        .unwrap();

    let err = store.delete_product(widget).await.unwrap_err();
    assert!(matches!(err, StoreError::ProductInUse(id) if id == widget));
    assert!(store.product_by_id(widget).await.unwrap().is_some());
}

#[tokio::test]
async fn product_update_and_delete() {
    let store = get_test_store().await;
    let widget = seed_product(&store, "Widget", 3, 500).await;

    let updated = store
        .update_product(
            widget,
            NewProduct::new("Widget v2", "newer", 7, Money::from_cents(600)),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Widget v2");
    assert_eq!(updated.stock, 7);
    assert_eq!(updated.price.cents(), 600);

    store.delete_product(widget).await.unwrap();
    assert!(store.product_by_id(widget).await.unwrap().is_none());
    assert!(matches!(
        store.delete_product(widget).await.unwrap_err(),
        StoreError::ProductNotFound(_)
    ));
}
