//! Error types for qb-link domain validation.

use chrono::NaiveDate;

use crate::ids::IdError;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when domain values fail validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// Amount is not a positive number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Due date precedes the transaction date.
    #[error("due date {due_date} is before transaction date {txn_date}")]
    InvalidDates {
        /// Transaction date.
        txn_date: NaiveDate,
        /// Due date.
        due_date: NaiveDate,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

/// Normalize a display name, rejecting names that are blank.
///
/// # Errors
///
/// Returns `Error::EmptyDisplayName` if nothing but whitespace was given.
pub fn normalize_display_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyDisplayName);
    }
    Ok(name.to_string())
}
