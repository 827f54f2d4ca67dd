//! Key encoding utilities for `RocksDB`.

use qb_link_core::CustomerId;

use crate::error::{Result, StoreError};

/// Create a customer key from a customer ID.
#[must_use]
pub fn customer_key(id: &CustomerId) -> Vec<u8> {
    id.to_bytes().to_vec()
}

/// Create a display name index key.
///
/// Display names are matched exactly, byte for byte.
#[must_use]
pub fn display_name_key(display_name: &str) -> Vec<u8> {
    display_name.as_bytes().to_vec()
}

/// Decode a customer ID stored as a key or index value.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the bytes are not a customer ID.
pub fn decode_customer_id(bytes: &[u8]) -> Result<CustomerId> {
    CustomerId::try_from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
