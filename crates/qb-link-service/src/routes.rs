//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, customers, health, invoices};
use crate::state::AppState;

/// Maximum number of customer requests in flight at once.
const CUSTOMER_CONCURRENCY_LIMIT: usize = 16;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Login
/// - `GET /` - Landing page with the Intuit login link
/// - `GET /auth` - Login link only
/// - `GET /callback` - OAuth redirect target
///
/// ## Customers (QuickBooks session required for writes)
/// - `GET /customers` - List customers
/// - `POST /customers` - Create customer (`displayName`)
/// - `GET /customers/:id/createSAInvoice` - Create salary advance invoice
/// - `GET /customers/:id/createTipInvoice` - Create tip invoice
///
/// ## Public
/// - `GET /health` - Health check
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let customer_routes = Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id/createSAInvoice",
            get(invoices::create_salary_advance_invoice),
        )
        .route(
            "/customers/:id/createTipInvoice",
            get(invoices::create_tip_invoice),
        )
        .layer(ConcurrencyLimitLayer::new(CUSTOMER_CONCURRENCY_LIMIT));

    Router::new()
        // Login
        .route("/", get(auth::index))
        .route("/auth", get(auth::auth_link))
        .route("/callback", get(auth::callback))
        // Health (public)
        .route("/health", get(health::health))
        // Customers
        .merge(customer_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
