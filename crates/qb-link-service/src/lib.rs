//! qb-link HTTP service.
//!
//! This crate links customer records in a local store to customers and
//! invoices in QuickBooks Online:
//!
//! - Intuit OAuth2 login (`/`, `/auth`, `/callback`)
//! - Customer listing and creation
//! - Salary advance and tip invoices
//!
//! # Session
//!
//! One process-wide QuickBooks session is created by the OAuth callback and
//! kept in memory until the process exits. Every QuickBooks operation checks
//! for it first; without one, write routes redirect to the login page.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod config;
pub mod error;
pub mod handlers;
pub mod linker;
pub mod oauth;
pub mod pages;
pub mod quickbooks;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use linker::{LinkError, Linker};
pub use oauth::{OAuthClient, OAuthError};
pub use quickbooks::{QuickBooksClient, QuickBooksError};
pub use routes::create_router;
pub use session::{AccountingSession, SessionSlot};
pub use state::AppState;
