//! Customer records.
//!
//! A `Customer` links a local record to the objects QuickBooks created for it.
//! Each external identifier is written back independently, after the remote
//! call that produced it succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// A locally persisted customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier.
    pub id: CustomerId,

    /// Human-readable name, unique across the store.
    pub display_name: String,

    /// Identifier QuickBooks assigned when the customer was created.
    pub external_customer_id: String,

    /// Salary advance invoice, once created.
    pub salary_advance_invoice_id: Option<String>,

    /// Tip invoice, once created.
    pub tip_invoice_id: Option<String>,

    /// Payment against the salary advance invoice. Not written by any route.
    pub salary_advance_payment_id: Option<String>,

    /// Payment against the tip invoice. Not written by any route.
    pub tip_payment_id: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new record for a customer that already exists in QuickBooks.
    #[must_use]
    pub fn new(display_name: impl Into<String>, external_customer_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::generate(),
            display_name: display_name.into(),
            external_customer_id: external_customer_id.into(),
            salary_advance_invoice_id: None,
            tip_invoice_id: None,
            salary_advance_payment_id: None,
            tip_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update into this record.
    ///
    /// Only the fields set in `update` change; `updated_at` is bumped.
    pub fn apply(&mut self, update: &CustomerUpdate) {
        if let Some(id) = &update.salary_advance_invoice_id {
            self.salary_advance_invoice_id = Some(id.clone());
        }
        if let Some(id) = &update.tip_invoice_id {
            self.tip_invoice_id = Some(id.clone());
        }
        if let Some(id) = &update.salary_advance_payment_id {
            self.salary_advance_payment_id = Some(id.clone());
        }
        if let Some(id) = &update.tip_payment_id {
            self.tip_payment_id = Some(id.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// A partial update to a [`Customer`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    /// New salary advance invoice id.
    pub salary_advance_invoice_id: Option<String>,
    /// New tip invoice id.
    pub tip_invoice_id: Option<String>,
    /// New salary advance payment id.
    pub salary_advance_payment_id: Option<String>,
    /// New tip payment id.
    pub tip_payment_id: Option<String>,
}

impl CustomerUpdate {
    /// An update that records the invoice of the given kind.
    #[must_use]
    pub fn invoice(kind: crate::InvoiceKind, invoice_id: impl Into<String>) -> Self {
        let invoice_id = Some(invoice_id.into());
        match kind {
            crate::InvoiceKind::SalaryAdvance => Self {
                salary_advance_invoice_id: invoice_id,
                ..Self::default()
            },
            crate::InvoiceKind::Tip => Self {
                tip_invoice_id: invoice_id,
                ..Self::default()
            },
        }
    }
}
