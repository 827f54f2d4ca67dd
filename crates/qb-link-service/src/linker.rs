//! Customer, invoice and payment operations.
//!
//! Each operation performs one remote create against QuickBooks; customer
//! creation also writes the local record. Every operation needs an
//! established session and fails with `LinkError::NoSession` before touching
//! the network otherwise. Failures stop the operation: nothing after a failed
//! call runs.

use std::sync::Arc;

use chrono::NaiveDate;

use qb_link_core::{normalize_display_name, validate_amount, Customer, InvoiceDates, InvoiceKind};
use qb_link_store::{Store, StoreError};

use crate::quickbooks::{self, CustomerInput, InvoiceInput, PaymentInput, QuickBooksError};
use crate::session::{AccountingSession, SessionSlot};

/// Errors from linker operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No QuickBooks session has been established.
    #[error("no QuickBooks session - authorize first")]
    NoSession,

    /// QuickBooks rejected or failed the call.
    #[error("QuickBooks error: {0}")]
    Remote(#[from] QuickBooksError),

    /// Local storage failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input failed validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] qb_link_core::Error),
}

/// Runs the remote and local steps of each operation.
#[derive(Clone)]
pub struct Linker {
    store: Arc<dyn Store>,
    sessions: SessionSlot,
}

impl Linker {
    /// Create a linker over a store and a session slot.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, sessions: SessionSlot) -> Self {
        Self { store, sessions }
    }

    async fn session(&self) -> Result<Arc<AccountingSession>, LinkError> {
        self.sessions.current().await.ok_or(LinkError::NoSession)
    }

    /// Create a customer in QuickBooks, then record it locally.
    ///
    /// A name already in the store is rejected before the remote call. If the
    /// local write fails after QuickBooks accepted the customer, the remote
    /// customer is left without a local record and the error is returned.
    ///
    /// # Errors
    ///
    /// - `LinkError::NoSession` if not authorized.
    /// - `LinkError::Invalid` if the name is blank.
    /// - `LinkError::Store(StoreError::DuplicateDisplayName)` if the name is taken.
    /// - `LinkError::Remote` if QuickBooks fails.
    pub async fn create_customer(&self, display_name: &str) -> Result<Customer, LinkError> {
        let session = self.session().await?;
        let display_name = normalize_display_name(display_name)?;

        if self.store.find_by_display_name(&display_name).await?.is_some() {
            return Err(StoreError::DuplicateDisplayName { display_name }.into());
        }

        tracing::info!(display_name = %display_name, "Creating QuickBooks customer");

        let remote = session
            .client()
            .create_customer(&CustomerInput {
                display_name: display_name.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(display_name = %display_name, error = %e, "QuickBooks customer creation failed");
                e
            })?;

        match self.store.create(&remote.display_name, &remote.id).await {
            Ok(customer) => {
                tracing::info!(
                    customer_id = %customer.id,
                    external_customer_id = %customer.external_customer_id,
                    "Customer linked"
                );
                Ok(customer)
            }
            Err(e) => {
                tracing::error!(
                    external_customer_id = %remote.id,
                    display_name = %remote.display_name,
                    error = %e,
                    "QuickBooks customer created but local record failed - orphaned"
                );
                Err(e.into())
            }
        }
    }

    /// Create a single-line invoice of the given kind.
    ///
    /// # Errors
    ///
    /// - `LinkError::NoSession` if not authorized.
    /// - `LinkError::Invalid` if the amount is not positive.
    /// - `LinkError::Remote` if QuickBooks fails.
    pub async fn create_invoice(
        &self,
        kind: InvoiceKind,
        external_customer_id: &str,
        amount: Option<f64>,
        dates: InvoiceDates,
    ) -> Result<quickbooks::Invoice, LinkError> {
        let session = self.session().await?;
        let amount = kind.amount_or_default(amount)?;

        let input = InvoiceInput::single_line(
            kind,
            external_customer_id,
            amount,
            dates.due_date(),
            dates.txn_date(),
        );

        let invoice = session
            .client()
            .create_invoice(&input)
            .await
            .map_err(|e| {
                tracing::error!(
                    kind = %kind,
                    external_customer_id = %external_customer_id,
                    error = %e,
                    "QuickBooks invoice creation failed"
                );
                e
            })?;

        tracing::info!(
            kind = %kind,
            external_customer_id = %external_customer_id,
            invoice_id = %invoice.id,
            amount = %amount,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Create a salary advance invoice (default amount 1000).
    ///
    /// # Errors
    ///
    /// See [`Linker::create_invoice`].
    pub async fn create_salary_advance_invoice(
        &self,
        external_customer_id: &str,
        amount: Option<f64>,
        dates: InvoiceDates,
    ) -> Result<quickbooks::Invoice, LinkError> {
        self.create_invoice(InvoiceKind::SalaryAdvance, external_customer_id, amount, dates)
            .await
    }

    /// Create a tip invoice (default amount 100).
    ///
    /// # Errors
    ///
    /// See [`Linker::create_invoice`].
    pub async fn create_tip_invoice(
        &self,
        external_customer_id: &str,
        amount: Option<f64>,
        dates: InvoiceDates,
    ) -> Result<quickbooks::Invoice, LinkError> {
        self.create_invoice(InvoiceKind::Tip, external_customer_id, amount, dates)
            .await
    }

    /// Record a payment against one invoice.
    ///
    /// Not exposed over HTTP.
    ///
    /// # Errors
    ///
    /// - `LinkError::NoSession` if not authorized.
    /// - `LinkError::Invalid` if the amount is not positive.
    /// - `LinkError::Remote` if QuickBooks fails.
    pub async fn create_payment(
        &self,
        external_customer_id: &str,
        amount: f64,
        invoice_id: &str,
        txn_date: NaiveDate,
    ) -> Result<quickbooks::Payment, LinkError> {
        let session = self.session().await?;
        validate_amount(amount)?;

        let input = PaymentInput::for_invoice(external_customer_id, amount, invoice_id, txn_date);

        let payment = session
            .client()
            .create_payment(&input)
            .await
            .map_err(|e| {
                tracing::error!(
                    external_customer_id = %external_customer_id,
                    invoice_id = %invoice_id,
                    error = %e,
                    "QuickBooks payment creation failed"
                );
                e
            })?;

        tracing::info!(
            external_customer_id = %external_customer_id,
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            "Payment recorded"
        );

        Ok(payment)
    }
}
