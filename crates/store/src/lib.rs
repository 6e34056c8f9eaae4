//! Persistence layer for the storefront backend.
//!
//! The centerpiece is the order transaction coordinator
//! ([`OrderStore::place_order`]): a single all-or-nothing transaction that
//! locks product rows through the inventory [`ledger`], validates stock,
//! snapshots prices, persists the order with its items, and decrements
//! inventory.

pub mod ledger;

mod error;
mod memory;
mod postgres;
mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{OrderStore, ProductStore, UserStore};
