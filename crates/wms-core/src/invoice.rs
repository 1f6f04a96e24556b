//! Invoice numbering, totals and payment status.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::is_whole_cents;

/// Prefix shared by every invoice code.
pub const INVOICE_CODE_PREFIX: &str = "INV";

/// Minimum width of the daily sequence number.
const SEQUENCE_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    #[error("Invoice must contain at least one item")]
    Empty,
    #[error("Item quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("Unit price cannot be negative")]
    NegativePrice,
    #[error("Discount cannot be negative")]
    NegativeDiscount,
    #[error("Tax cannot be negative")]
    NegativeTax,
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: Decimal, subtotal: Decimal },
    #[error("Payment amount must be greater than zero")]
    NonPositivePayment,
    #[error("Payment of {amount} exceeds the remaining balance {remaining}")]
    Overpayment { amount: Decimal, remaining: Decimal },
    #[error("Amount {0} has more than 2 decimal places")]
    SubCentAmount(Decimal),
}

fn require_cents(amount: Decimal) -> Result<Decimal, InvoiceError> {
    if is_whole_cents(amount) {
        Ok(amount)
    } else {
        Err(InvoiceError::SubCentAmount(amount))
    }
}

/// Code prefix for invoices issued on `date`, e.g. `INV-20240105-`.
pub fn invoice_code_prefix(date: NaiveDate) -> String {
    format!("{INVOICE_CODE_PREFIX}-{}-", date.format("%Y%m%d"))
}

/// Compute the next invoice code for `date`.
///
/// `latest` is the highest code already issued with the same date prefix, if
/// any. Codes from another day, or codes whose suffix is not a number, restart
/// the sequence at 1.
///
/// ```
/// use chrono::NaiveDate;
/// use wms_core::invoice::next_invoice_code;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(next_invoice_code(day, None), "INV-20240105-0001");
/// assert_eq!(next_invoice_code(day, Some("INV-20240105-0041")), "INV-20240105-0042");
/// ```
pub fn next_invoice_code(date: NaiveDate, latest: Option<&str>) -> String {
    let prefix = invoice_code_prefix(date);

    let next = latest
        .and_then(|code| code.strip_prefix(prefix.as_str()))
        .and_then(|seq| seq.parse::<u64>().ok())
        .map_or(1, |seq| seq + 1);

    format!("{prefix}{next:0width$}", width = SEQUENCE_WIDTH)
}

/// Monetary summary of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Total of one invoice line.
pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    (Decimal::from(quantity) * unit_price).round_dp(2)
}

/// Compute invoice totals from `(quantity, unit_price)` lines.
///
/// `total = subtotal - discount + tax`. Prices, discount and tax must be whole
/// cents.
pub fn compute_totals(
    lines: &[(i32, Decimal)],
    discount: Decimal,
    tax: Decimal,
) -> Result<InvoiceTotals, InvoiceError> {
    if lines.is_empty() {
        return Err(InvoiceError::Empty);
    }
    if discount < Decimal::ZERO {
        return Err(InvoiceError::NegativeDiscount);
    }
    if tax < Decimal::ZERO {
        return Err(InvoiceError::NegativeTax);
    }
    let discount = require_cents(discount)?;
    let tax = require_cents(tax)?;

    let mut subtotal = Decimal::ZERO;
    for &(quantity, unit_price) in lines {
        if quantity <= 0 {
            return Err(InvoiceError::NonPositiveQuantity);
        }
        if unit_price < Decimal::ZERO {
            return Err(InvoiceError::NegativePrice);
        }
        require_cents(unit_price)?;
        subtotal += line_total(quantity, unit_price);
    }

    if discount > subtotal {
        return Err(InvoiceError::DiscountExceedsSubtotal { discount, subtotal });
    }

    Ok(InvoiceTotals {
        subtotal,
        discount,
        tax,
        total: subtotal - discount + tax,
    })
}

/// Invoice lifecycle status as stored in the `invoices.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    /// Status implied by the amount paid so far.
    pub fn from_amounts(paid: Decimal, total: Decimal) -> Self {
        if paid >= total {
            Self::Paid
        } else if paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown invoice status: '{other}'")),
        }
    }
}

/// Validate a payment against the outstanding balance and return the new
/// paid amount.
///
/// Amounts finer than a cent are rejected.
pub fn apply_payment(
    paid: Decimal,
    total: Decimal,
    amount: Decimal,
) -> Result<Decimal, InvoiceError> {
    if amount <= Decimal::ZERO {
        return Err(InvoiceError::NonPositivePayment);
    }
    let amount = require_cents(amount)?;

    let remaining = total - paid;
    if amount > remaining {
        return Err(InvoiceError::Overpayment {
            amount,
            remaining: remaining.max(Decimal::ZERO),
        });
    }

    Ok(paid + amount)
}
