//! Core domain logic for the warehouse management backend.
//!
//! Everything in this crate is free of I/O: invoice numbering and totals,
//! money precision, permission set arithmetic, stock movement rules and the
//! CSV writer used by the export endpoints.

pub mod csv;
pub mod invoice;
pub mod money;
pub mod permissions;
pub mod stock;

pub use invoice::{InvoiceError, InvoiceTotals, PaymentStatus};
pub use stock::{MovementKind, StockError};
