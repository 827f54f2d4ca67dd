//! Invoice handlers.
//!
//! Both routes look the customer up, raise the invoice in QuickBooks and then
//! record the invoice ID on the customer. A failed QuickBooks call leaves the
//! record untouched.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use qb_link_core::{CustomerId, CustomerUpdate, InvoiceDates, InvoiceKind};

use crate::error::ApiError;
use crate::state::AppState;

/// Optional invoice parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    /// Line amount (defaults per invoice kind).
    pub amount: Option<f64>,
    /// Transaction date (defaults to today, UTC).
    pub txn_date: Option<NaiveDate>,
    /// Due date (defaults to the transaction date plus the configured net days).
    pub due_date: Option<NaiveDate>,
}

impl InvoiceQuery {
    fn dates(&self, net_days: u64) -> Result<InvoiceDates, ApiError> {
        let txn_date = self.txn_date.unwrap_or_else(|| Utc::now().date_naive());
        let dates = match self.due_date {
            Some(due_date) => InvoiceDates::new(txn_date, due_date)?,
            None => InvoiceDates::net(txn_date, net_days)?,
        };
        Ok(dates)
    }
}

/// `GET /customers/:id/createSAInvoice`
pub async fn create_salary_advance_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<InvoiceQuery>, QueryRejection>,
) -> Result<Redirect, ApiError> {
    create_invoice(&state, InvoiceKind::SalaryAdvance, &id, query).await
}

/// `GET /customers/:id/createTipInvoice`
pub async fn create_tip_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<InvoiceQuery>, QueryRejection>,
) -> Result<Redirect, ApiError> {
    create_invoice(&state, InvoiceKind::Tip, &id, query).await
}

async fn create_invoice(
    state: &AppState,
    kind: InvoiceKind,
    id: &str,
    query: Result<Query<InvoiceQuery>, QueryRejection>,
) -> Result<Redirect, ApiError> {
    // Session check comes before the customer lookup and query validation.
    if !state.has_session().await {
        return Err(ApiError::SessionRequired);
    }

    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let id: CustomerId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Customer not found: {id}")))?;

    let customer = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer not found: {id}")))?;

    let dates = query.dates(state.config.invoice_due_days)?;

    let invoice = state
        .linker
        .create_invoice(kind, &customer.external_customer_id, query.amount, dates)
        .await?;

    let updated = state
        .store
        .update(&customer.id, &CustomerUpdate::invoice(kind, &invoice.id))
        .await
        .map_err(|e| {
            tracing::error!(
                customer_id = %customer.id,
                invoice_id = %invoice.id,
                error = %e,
                "Invoice created but customer record not updated"
            );
            e
        })?;

    if updated.is_none() {
        tracing::warn!(
            customer_id = %customer.id,
            invoice_id = %invoice.id,
            "Customer removed before invoice could be recorded"
        );
        return Err(ApiError::NotFound(format!("Customer not found: {id}")));
    }

    Ok(Redirect::to("/customers"))
}
