use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Invoice, InvoiceItem, InvoicePayment, InvoiceState};

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter<'a> {
    pub status: Option<&'a str>,
    pub customer_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub to: Option<DateTime<Utc>>,
}

/// Serialize invoice numbering for the rest of the transaction.
pub async fn lock_code_sequence<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('invoice_code'))")
        .execute(executor)
        .await?;
    Ok(())
}

/// Highest code issued with `prefix`. Longer codes sort first so the sequence
/// keeps growing once it passes four digits.
pub async fn latest_code_with_prefix<'e, E>(
    executor: E,
    prefix: &str,
) -> Result<Option<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT code
            FROM invoices
            WHERE starts_with(code, $1)
            ORDER BY length(code) DESC, code DESC
            LIMIT 1
        "#,
    )
    .bind(prefix)
    .fetch_optional(executor)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert<'e, E>(
    executor: E,
    code: &str,
    customer_id: Uuid,
    warehouse_id: Uuid,
    status: &str,
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    total: Decimal,
    paid_amount: Decimal,
    note: Option<&str>,
    created_by: Option<Uuid>,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO invoices
                (code, customer_id, warehouse_id, status, subtotal, discount, tax, total,
                 paid_amount, note, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
        "#,
    )
    .bind(code)
    .bind(customer_id)
    .bind(warehouse_id)
    .bind(status)
    .bind(subtotal)
    .bind(discount)
    .bind(tax)
    .bind(total)
    .bind(paid_amount)
    .bind(note)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_item<'e, E>(
    executor: E,
    invoice_id: Uuid,
    product_id: Uuid,
    location_id: Option<Uuid>,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
    position: i32,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO invoice_items
                (invoice_id, product_id, location_id, quantity, unit_price, line_total, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
        "#,
    )
    .bind(invoice_id)
    .bind(product_id)
    .bind(location_id)
    .bind(quantity)
    .bind(unit_price)
    .bind(line_total)
    .bind(position)
    .fetch_one(executor)
    .await
}

pub async fn insert_payment<'e, E>(
    executor: E,
    invoice_id: Uuid,
    amount: Decimal,
    method: &str,
    note: Option<&str>,
    created_by: Option<Uuid>,
) -> Result<InvoicePayment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO invoice_payments (invoice_id, amount, method, note, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, invoice_id, amount, method, note, paid_at, created_by
        "#,
    )
    .bind(invoice_id)
    .bind(amount)
    .bind(method)
    .bind(note)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

/// Lock the invoice row for the rest of the transaction.
pub async fn lock_state<'e, E>(executor: E, invoice_id: Uuid) -> Result<Option<InvoiceState>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, code, warehouse_id, status, total, paid_amount
            FROM invoices
            WHERE id = $1
            FOR UPDATE
        "#,
    )
    .bind(invoice_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_payment_state<'e, E>(
    executor: E,
    invoice_id: Uuid,
    paid_amount: Decimal,
    status: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invoices
            SET paid_amount = $2, status = $3, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(invoice_id)
    .bind(paid_amount)
    .bind(status)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn set_status<'e, E>(executor: E, invoice_id: Uuid, status: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE invoices SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(invoice_id)
        .bind(status)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn payment_count<'e, E>(executor: E, invoice_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM invoice_payments WHERE invoice_id = $1")
        .bind(invoice_id)
        .fetch_one(executor)
        .await
}

/// `limit = None` returns every matching row.
pub async fn list<'e, E>(
    executor: E,
    filter: &InvoiceFilter<'_>,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<Invoice>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT i.id, i.code, i.customer_id, c.code AS customer_code, c.name AS customer_name,
                   i.warehouse_id, w.name AS warehouse_name, i.status, i.subtotal, i.discount,
                   i.tax, i.total, i.paid_amount, i.note, i.created_by, i.created_at, i.updated_at
            FROM invoices i
            JOIN customers c ON c.id = i.customer_id
            JOIN warehouses w ON w.id = i.warehouse_id
            WHERE ($1::text IS NULL OR i.status = $1)
              AND ($2::uuid IS NULL OR i.customer_id = $2)
              AND ($3::timestamptz IS NULL OR i.created_at >= $3)
              AND ($4::timestamptz IS NULL OR i.created_at < $4)
            ORDER BY i.created_at DESC, i.code DESC
            LIMIT $5 OFFSET $6
        "#,
    )
    .bind(filter.status)
    .bind(filter.customer_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &InvoiceFilter<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM invoices i
            WHERE ($1::text IS NULL OR i.status = $1)
              AND ($2::uuid IS NULL OR i.customer_id = $2)
              AND ($3::timestamptz IS NULL OR i.created_at >= $3)
              AND ($4::timestamptz IS NULL OR i.created_at < $4)
        "#,
    )
    .bind(filter.status)
    .bind(filter.customer_id)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, invoice_id: Uuid) -> Result<Option<Invoice>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT i.id, i.code, i.customer_id, c.code AS customer_code, c.name AS customer_name,
                   i.warehouse_id, w.name AS warehouse_name, i.status, i.subtotal, i.discount,
                   i.tax, i.total, i.paid_amount, i.note, i.created_by, i.created_at, i.updated_at
            FROM invoices i
            JOIN customers c ON c.id = i.customer_id
            JOIN warehouses w ON w.id = i.warehouse_id
            WHERE i.id = $1
        "#,
    )
    .bind(invoice_id)
    .fetch_optional(executor)
    .await
}

pub async fn items<'e, E>(executor: E, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT it.id, it.invoice_id, it.product_id, p.sku AS product_sku,
                   p.name AS product_name, p.unit, it.location_id, it.quantity,
                   it.unit_price, it.line_total
            FROM invoice_items it
            JOIN products p ON p.id = it.product_id
            WHERE it.invoice_id = $1
            ORDER BY it.position
        "#,
    )
    .bind(invoice_id)
    .fetch_all(executor)
    .await
}

pub async fn payments<'e, E>(executor: E, invoice_id: Uuid) -> Result<Vec<InvoicePayment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, invoice_id, amount, method, note, paid_at, created_by
            FROM invoice_payments
            WHERE invoice_id = $1
            ORDER BY paid_at, id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(executor)
    .await
}
