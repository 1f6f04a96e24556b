use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use wms_db::models::{Invoice, InvoiceItem, InvoicePayment};

/// Accepted payment methods, matching the `invoice_payments.method` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    /// First day included
    pub from: Option<NaiveDate>,
    /// Last day included
    pub to: Option<NaiveDate>,
}

/// Start of `date` in UTC.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound covering the whole of `date`.
pub fn day_end_exclusive(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.checked_add_days(Days::new(1)).map(day_start)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceItemRequest {
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: i32,
    /// Defaults to the product price
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentRequest {
    #[validate(custom(function = "crate::validation::validate_positive"))]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
    #[validate(nested)]
    pub items: Vec<InvoiceItemRequest>,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub discount: Option<Decimal>,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub tax: Option<Decimal>,
    pub note: Option<String>,
    #[validate(nested)]
    pub payment: Option<PaymentRequest>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<InvoicePayment>,
}
