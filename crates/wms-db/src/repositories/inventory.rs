use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{InventoryItem, InventoryTransaction, NewInventoryTransaction, StockSlot};

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    /// Only rows whose quantity is at or below this threshold
    pub max_quantity: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter<'a> {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub kind: Option<&'a str>,
    pub reference: Option<&'a str>,
}

/// `limit = None` returns every matching row.
pub async fn list<'e, E>(
    executor: E,
    filter: &InventoryFilter,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<InventoryItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT i.id, i.product_id, p.sku AS product_sku, p.name AS product_name,
                   i.warehouse_id, w.code AS warehouse_code, w.name AS warehouse_name,
                   i.location_id, l.code AS location_code, i.quantity, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            JOIN warehouses w ON w.id = i.warehouse_id
            LEFT JOIN warehouse_locations l ON l.id = i.location_id
            WHERE ($1::uuid IS NULL OR i.product_id = $1)
              AND ($2::uuid IS NULL OR i.warehouse_id = $2)
              AND ($3::integer IS NULL OR i.quantity <= $3)
            ORDER BY p.sku, w.code, l.code NULLS FIRST
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .bind(filter.max_quantity)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &InventoryFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM inventory i
            WHERE ($1::uuid IS NULL OR i.product_id = $1)
              AND ($2::uuid IS NULL OR i.warehouse_id = $2)
              AND ($3::integer IS NULL OR i.quantity <= $3)
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .bind(filter.max_quantity)
    .fetch_one(executor)
    .await
}

/// Lock the stock row of a (product, warehouse, location) slot for the rest of
/// the transaction, creating it with quantity 0 when it does not exist yet.
pub async fn lock_slot<'e, E>(
    executor: E,
    product_id: Uuid,
    warehouse_id: Uuid,
    location_id: Option<Uuid>,
) -> Result<StockSlot, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO inventory (product_id, warehouse_id, location_id, quantity)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT ON CONSTRAINT inventory_slot_key
            DO UPDATE SET updated_at = inventory.updated_at
            RETURNING id, quantity
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(location_id)
    .fetch_one(executor)
    .await
}

pub async fn set_quantity<'e, E>(executor: E, inventory_id: Uuid, quantity: i32) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE inventory SET quantity = $2, updated_at = NOW() WHERE id = $1")
        .bind(inventory_id)
        .bind(quantity)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_transaction<'e, E>(
    executor: E,
    tx: &NewInventoryTransaction<'_>,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO inventory_transactions
                (inventory_id, product_id, warehouse_id, location_id, kind,
                 quantity, quantity_after, reference, note, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
        "#,
    )
    .bind(tx.inventory_id)
    .bind(tx.product_id)
    .bind(tx.warehouse_id)
    .bind(tx.location_id)
    .bind(tx.kind)
    .bind(tx.quantity)
    .bind(tx.quantity_after)
    .bind(tx.reference)
    .bind(tx.note)
    .bind(tx.created_by)
    .fetch_one(executor)
    .await
}

pub async fn list_transactions<'e, E>(
    executor: E,
    filter: &TransactionFilter<'_>,
    limit: i64,
    offset: i64,
) -> Result<Vec<InventoryTransaction>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT t.id, t.inventory_id, t.product_id, p.sku AS product_sku, t.warehouse_id,
                   t.location_id, t.kind, t.quantity, t.quantity_after, t.reference, t.note,
                   t.created_by, t.created_at
            FROM inventory_transactions t
            JOIN products p ON p.id = t.product_id
            WHERE ($1::uuid IS NULL OR t.product_id = $1)
              AND ($2::uuid IS NULL OR t.warehouse_id = $2)
              AND ($3::text IS NULL OR t.kind = $3)
              AND ($4::text IS NULL OR t.reference = $4)
            ORDER BY t.created_at DESC, t.id
            LIMIT $5 OFFSET $6
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .bind(filter.kind)
    .bind(filter.reference)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count_transactions<'e, E>(
    executor: E,
    filter: &TransactionFilter<'_>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM inventory_transactions t
            WHERE ($1::uuid IS NULL OR t.product_id = $1)
              AND ($2::uuid IS NULL OR t.warehouse_id = $2)
              AND ($3::text IS NULL OR t.kind = $3)
              AND ($4::text IS NULL OR t.reference = $4)
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .bind(filter.kind)
    .bind(filter.reference)
    .fetch_one(executor)
    .await
}

/// Quantity on hand for the product across all warehouses
pub async fn product_total<'e, E>(executor: E, product_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM inventory WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_one(executor)
    .await
}
