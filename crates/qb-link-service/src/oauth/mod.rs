//! Intuit OAuth2 integration.
//!
//! Implements the authorization-code flow used to connect a QuickBooks
//! company:
//! - Authorization URL generation
//! - Callback validation (`state`, denial)
//! - Code-for-token exchange

pub mod client;
pub mod types;

pub use client::{OAuthClient, OAuthError};
pub use types::*;
