//! Customer record storage for qb-link.
//!
//! This crate persists the link between a local customer record and the
//! identifiers QuickBooks assigned to that customer and its invoices.
//!
//! # Backends
//!
//! - [`RocksStore`]: embedded `RocksDB`, CBOR-encoded documents, with a
//!   display name index column family (feature `rocksdb-backend`, default).
//! - [`PgStore`]: PostgreSQL via `sqlx`, with a `UNIQUE` display name column.
//!
//! Neither backend offers transactions or optimistic concurrency: concurrent
//! updates to the same record are last-write-wins.
//!
//! # Example
//!
//! ```no_run
//! use qb_link_store::{RocksStore, Store};
//!
//! # async fn run() -> qb_link_store::Result<()> {
//! let store = RocksStore::open("/tmp/qb-link-db")?;
//!
//! let customer = store.create("Jane Doe", "58").await?;
//! let found = store.find_by_display_name("Jane Doe").await?;
//! assert_eq!(found.map(|c| c.id), Some(customer.id));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod postgres;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use postgres::PgStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;
use qb_link_core::{Customer, CustomerId, CustomerUpdate};

/// The storage trait defining all customer record operations.
///
/// Lookups return `Ok(None)` when nothing matches; callers decide how a missing
/// record is reported.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a customer by its local ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>>;

    /// Get a customer by its display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<Customer>>;

    /// List all customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_all(&self) -> Result<Vec<Customer>>;

    /// Insert a new customer record.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateDisplayName` if the display name is taken.
    /// - An error if the database operation fails.
    async fn create(&self, display_name: &str, external_customer_id: &str) -> Result<Customer>;

    /// Merge `update` into an existing record and return the result.
    ///
    /// Returns `Ok(None)` if no record has this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn update(&self, id: &CustomerId, update: &CustomerUpdate) -> Result<Option<Customer>>;
}
