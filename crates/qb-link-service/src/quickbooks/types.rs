//! QuickBooks Online API types.
//!
//! Field names follow the API's PascalCase convention. Responses wrap the
//! entity in an envelope keyed by its type name (`{"Customer": {...}}`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use qb_link_core::InvoiceKind;

/// Line detail type for item sales lines.
pub const SALES_ITEM_LINE_DETAIL: &str = "SalesItemLineDetail";

/// Linked transaction type for invoice payments.
pub const TXN_TYPE_INVOICE: &str = "Invoice";

/// A reference to another QuickBooks entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Referenced entity ID.
    pub value: String,
    /// Referenced entity name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// A reference by ID only.
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: None,
        }
    }

    /// A reference by ID and name.
    #[must_use]
    pub fn named(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: Some(name.into()),
        }
    }
}

/// Customer creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerInput {
    /// Display name, unique per company.
    pub display_name: String,
}

/// QuickBooks customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    /// QuickBooks ID.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Optimistic locking token.
    #[serde(default)]
    pub sync_token: Option<String>,
}

/// Customer response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerResponse {
    /// Customer data.
    #[serde(rename = "Customer")]
    pub customer: Customer,
}

/// Invoice creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceInput {
    /// Customer being invoiced.
    pub customer_ref: Reference,
    /// Invoice lines.
    pub line: Vec<InvoiceLine>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Transaction date.
    pub txn_date: NaiveDate,
}

impl InvoiceInput {
    /// A single-line invoice of the given kind.
    #[must_use]
    pub fn single_line(
        kind: InvoiceKind,
        customer_id: impl Into<String>,
        amount: f64,
        due_date: NaiveDate,
        txn_date: NaiveDate,
    ) -> Self {
        Self {
            customer_ref: Reference::id(customer_id),
            line: vec![InvoiceLine {
                amount,
                detail_type: SALES_ITEM_LINE_DETAIL.to_string(),
                sales_item_line_detail: SalesItemLineDetail {
                    item_ref: Reference::named(kind.item_code(), kind.item_name()),
                    tax_code_ref: Reference::id(kind.tax_code()),
                },
            }],
            due_date,
            txn_date,
        }
    }
}

/// An invoice line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceLine {
    /// Line amount.
    pub amount: f64,
    /// Line detail type.
    pub detail_type: String,
    /// Sales item details.
    pub sales_item_line_detail: SalesItemLineDetail,
}

/// Sales item line details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesItemLineDetail {
    /// Item sold.
    pub item_ref: Reference,
    /// Tax code applied.
    pub tax_code_ref: Reference,
}

/// QuickBooks invoice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    /// QuickBooks ID.
    pub id: String,
    /// Invoice number.
    #[serde(default)]
    pub doc_number: Option<String>,
    /// Total amount.
    #[serde(default)]
    pub total_amt: Option<f64>,
    /// Open balance.
    #[serde(default)]
    pub balance: Option<f64>,
    /// Customer invoiced.
    #[serde(default)]
    pub customer_ref: Option<Reference>,
}

/// Invoice response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResponse {
    /// Invoice data.
    #[serde(rename = "Invoice")]
    pub invoice: Invoice,
}

/// Payment creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentInput {
    /// Paying customer.
    pub customer_ref: Reference,
    /// Total payment amount.
    pub total_amt: f64,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Payment lines.
    pub line: Vec<PaymentLine>,
}

impl PaymentInput {
    /// A payment settling `amount` against one invoice.
    #[must_use]
    pub fn for_invoice(
        customer_id: impl Into<String>,
        amount: f64,
        invoice_id: impl Into<String>,
        txn_date: NaiveDate,
    ) -> Self {
        Self {
            customer_ref: Reference::id(customer_id),
            total_amt: amount,
            txn_date,
            line: vec![PaymentLine {
                amount,
                linked_txn: vec![LinkedTxn {
                    txn_id: invoice_id.into(),
                    txn_type: TXN_TYPE_INVOICE.to_string(),
                }],
            }],
        }
    }
}

/// A payment line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentLine {
    /// Amount applied.
    pub amount: f64,
    /// Transactions the amount is applied to.
    pub linked_txn: Vec<LinkedTxn>,
}

/// A transaction a payment line is applied to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkedTxn {
    /// Transaction ID.
    pub txn_id: String,
    /// Transaction type.
    pub txn_type: String,
}

/// QuickBooks payment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    /// QuickBooks ID.
    pub id: String,
    /// Total amount.
    #[serde(default)]
    pub total_amt: Option<f64>,
    /// Unapplied amount.
    #[serde(default)]
    pub unapplied_amt: Option<f64>,
}

/// Payment response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    /// Payment data.
    #[serde(rename = "Payment")]
    pub payment: Payment,
}

/// Error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct FaultResponse {
    /// The fault.
    #[serde(rename = "Fault")]
    pub fault: Fault,
}

/// A QuickBooks fault.
#[derive(Debug, Clone, Deserialize)]
pub struct Fault {
    /// Individual errors.
    #[serde(rename = "Error", default)]
    pub errors: Vec<FaultError>,
    /// Fault type (e.g. `ValidationFault`, `AuthenticationFault`).
    #[serde(rename = "type", default)]
    pub fault_type: Option<String>,
}

/// A single fault error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaultError {
    /// Short message.
    pub message: String,
    /// Longer explanation.
    #[serde(default)]
    pub detail: Option<String>,
    /// Error code.
    #[serde(rename = "code", default)]
    pub code: Option<String>,
}
