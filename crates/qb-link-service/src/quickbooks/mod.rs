//! QuickBooks Online accounting API integration.
//!
//! Only the create operations this service needs are covered:
//! - Customers
//! - Invoices
//! - Payments

pub mod client;
pub mod types;

pub use client::{QuickBooksClient, QuickBooksError};
pub use types::*;
