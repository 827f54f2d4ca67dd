//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Customer records, keyed by `CustomerId` (ULID).
    pub const CUSTOMERS: &str = "customers";

    /// Index: customer id by display name.
    /// Enforces display name uniqueness.
    pub const CUSTOMERS_BY_DISPLAY_NAME: &str = "customers_by_display_name";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::CUSTOMERS, cf::CUSTOMERS_BY_DISPLAY_NAME]
}
