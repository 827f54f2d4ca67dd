//! Invoice kinds and dates.
//!
//! The two invoice kinds differ only in their fixed line item: the QuickBooks
//! item and tax code references and the default amount.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The kinds of invoice this system creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Salary advance: item "Salary Advance" (31), tax code 7.
    SalaryAdvance,
    /// Tip: item "Tip" (30), tax code 11.
    Tip,
}

impl InvoiceKind {
    /// Display name of the QuickBooks item on the invoice line.
    #[must_use]
    pub const fn item_name(self) -> &'static str {
        match self {
            Self::SalaryAdvance => "Salary Advance",
            Self::Tip => "Tip",
        }
    }

    /// QuickBooks item reference.
    #[must_use]
    pub const fn item_code(self) -> &'static str {
        match self {
            Self::SalaryAdvance => "31",
            Self::Tip => "30",
        }
    }

    /// QuickBooks tax code reference.
    #[must_use]
    pub const fn tax_code(self) -> &'static str {
        match self {
            Self::SalaryAdvance => "7",
            Self::Tip => "11",
        }
    }

    /// Amount used when the caller does not give one.
    #[must_use]
    pub const fn default_amount(self) -> f64 {
        match self {
            Self::SalaryAdvance => 1000.0,
            Self::Tip => 100.0,
        }
    }

    /// Resolve the amount for an invoice of this kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAmount` if the given amount is not a positive number.
    pub fn amount_or_default(self, amount: Option<f64>) -> Result<f64> {
        let amount = amount.unwrap_or_else(|| self.default_amount());
        validate_amount(amount)?;
        Ok(amount)
    }
}

impl std::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.item_name())
    }
}

/// Check that a monetary amount is finite and strictly positive.
///
/// # Errors
///
/// Returns `Error::InvalidAmount` otherwise.
pub fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount.to_string()))
    }
}

/// Transaction and due date of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDates {
    txn_date: NaiveDate,
    due_date: NaiveDate,
}

impl InvoiceDates {
    /// Create invoice dates.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDates` if the due date is before the transaction date.
    pub fn new(txn_date: NaiveDate, due_date: NaiveDate) -> Result<Self> {
        if due_date < txn_date {
            return Err(Error::InvalidDates { txn_date, due_date });
        }
        Ok(Self { txn_date, due_date })
    }

    /// Dates for an invoice issued on `txn_date` and due `net_days` later.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDates` if the due date overflows the calendar.
    pub fn net(txn_date: NaiveDate, net_days: u64) -> Result<Self> {
        let due_date = txn_date
            .checked_add_days(Days::new(net_days))
            .ok_or(Error::InvalidDates {
                txn_date,
                due_date: NaiveDate::MAX,
            })?;
        Self::new(txn_date, due_date)
    }

    /// The transaction date.
    #[must_use]
    pub const fn txn_date(&self) -> NaiveDate {
        self.txn_date
    }

    /// The due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}
