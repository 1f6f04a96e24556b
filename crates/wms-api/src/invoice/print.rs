//! Printable HTML rendering of an invoice.

use askama::Template;
use wms_core::money::format_money;
use wms_db::models::{Customer, InvoiceItem};

use super::model::InvoiceDetail;
use crate::error::ApiError;

/// One printed invoice line.
#[derive(Debug, Clone)]
pub struct PrintItemView {
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&InvoiceItem> for PrintItemView {
    fn from(item: &InvoiceItem) -> Self {
        Self {
            sku: item.product_sku.clone(),
            name: item.product_name.clone(),
            unit: item.unit.clone(),
            quantity: item.quantity,
            unit_price: format_money(item.unit_price),
            line_total: format_money(item.line_total),
        }
    }
}

/// Invoice print template.
#[derive(Debug, Template)]
#[template(path = "invoice.html")]
pub struct InvoicePrintTemplate {
    pub code: String,
    pub date: String,
    pub customer_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub warehouse_name: String,
    pub status: String,
    pub items: Vec<PrintItemView>,
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
    pub paid_amount: String,
    pub balance: String,
    pub note: Option<String>,
}

impl InvoicePrintTemplate {
    pub fn new(detail: &InvoiceDetail, customer: Option<&Customer>) -> Self {
        let invoice = &detail.invoice;

        Self {
            code: invoice.code.clone(),
            date: invoice.created_at.format("%Y-%m-%d").to_string(),
            customer_code: invoice.customer_code.clone(),
            customer_name: invoice.customer_name.clone(),
            customer_phone: customer.and_then(|c| c.phone.clone()).unwrap_or_default(),
            customer_address: customer
                .and_then(|c| c.address.clone())
                .unwrap_or_default(),
            warehouse_name: invoice.warehouse_name.clone(),
            status: invoice.status.clone(),
            items: detail.items.iter().map(PrintItemView::from).collect(),
            subtotal: format_money(invoice.subtotal),
            discount: format_money(invoice.discount),
            tax: format_money(invoice.tax),
            total: format_money(invoice.total),
            paid_amount: format_money(invoice.paid_amount),
            balance: format_money(invoice.total - invoice.paid_amount),
            note: invoice.note.clone().filter(|note| !note.trim().is_empty()),
        }
    }
}

pub fn render_invoice(
    detail: &InvoiceDetail,
    customer: Option<&Customer>,
) -> Result<String, ApiError> {
    InvoicePrintTemplate::new(detail, customer)
        .render()
        .map_err(|e| ApiError::Internal(format!("invoice template render failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;
    use wms_db::models::Invoice;

    fn detail() -> InvoiceDetail {
        let invoice_id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();

        InvoiceDetail {
            invoice: Invoice {
                id: invoice_id,
                code: "INV-20240105-0001".to_string(),
                customer_id: Uuid::new_v4(),
                customer_code: "C001".to_string(),
                customer_name: "Tom & Jerry <Ltd>".to_string(),
                warehouse_id: Uuid::new_v4(),
                warehouse_name: "Main".to_string(),
                status: "partial".to_string(),
                subtotal: Decimal::new(3000, 2),
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                total: Decimal::new(3000, 2),
                paid_amount: Decimal::new(1000, 2),
                note: None,
                created_by: None,
                created_at,
                updated_at: created_at,
            },
            items: vec![
                InvoiceItem {
                    id: Uuid::new_v4(),
                    invoice_id,
                    product_id: Uuid::new_v4(),
                    product_sku: "BOLT-1".to_string(),
                    product_name: "Bolt".to_string(),
                    unit: "pcs".to_string(),
                    location_id: None,
                    quantity: 3,
                    unit_price: Decimal::new(5, 0),
                    line_total: Decimal::new(15, 0),
                },
                InvoiceItem {
                    id: Uuid::new_v4(),
                    invoice_id,
                    product_id: Uuid::new_v4(),
                    product_sku: "NUT-2".to_string(),
                    product_name: "Nut".to_string(),
                    unit: "pcs".to_string(),
                    location_id: None,
                    quantity: 5,
                    unit_price: Decimal::new(300, 2),
                    line_total: Decimal::new(1500, 2),
                },
            ],
            payments: Vec::new(),
        }
    }

    #[test]
    fn test_render_invoice() {
        let html = render_invoice(&detail(), None).unwrap();

        assert!(html.contains("<title>Invoice INV-20240105-0001</title>"));
        assert!(html.contains("<td>2024-01-05</td>"));
        assert!(html.contains("<td>1</td><td>BOLT-1</td><td>Bolt</td>"));
        assert!(html.contains("<td>2</td><td>NUT-2</td><td>Nut</td>"));
        assert!(html.contains("<td class=\"num\">5.00</td>"));
        assert!(html.contains("<td class=\"num\">20.00</td>"));
        assert!(html.contains("<td class=\"num\">0.00</td>"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_customer_values_are_escaped() {
        let html = render_invoice(&detail(), None).unwrap();

        assert!(html.contains("Tom &#38; Jerry &#60;Ltd&#62;"));
        assert!(!html.contains("<Ltd>"));
    }

    #[test]
    fn test_note_is_printed() {
        let mut detail = detail();
        detail.invoice.note = Some("Deliver before noon".to_string());

        let html = render_invoice(&detail, None).unwrap();

        assert!(html.contains("<p>Deliver before noon</p>"));
    }
}
