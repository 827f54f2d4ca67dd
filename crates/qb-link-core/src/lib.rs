//! Core types for qb-link.
//!
//! qb-link keeps a local record for every customer it creates in QuickBooks
//! Online and writes back the identifiers of the invoices it raises for them.
//!
//! - **Identifiers**: `CustomerId`
//! - **Records**: `Customer`, `CustomerUpdate`
//! - **Invoices**: `InvoiceKind`, `InvoiceDates`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod customer;
pub mod error;
pub mod ids;
pub mod invoice;

pub use customer::{Customer, CustomerUpdate};
pub use error::{normalize_display_name, Error, Result};
pub use ids::{CustomerId, IdError};
pub use invoice::{validate_amount, InvoiceDates, InvoiceKind};
