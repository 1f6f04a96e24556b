use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Warehouse, WarehouseLocation};

pub async fn list<'e, E>(executor: E) -> Result<Vec<Warehouse>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, code, name, address, is_active, created_at, updated_at
            FROM warehouses
            ORDER BY code
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, warehouse_id: Uuid) -> Result<Option<Warehouse>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, code, name, address, is_active, created_at, updated_at
            FROM warehouses
            WHERE id = $1
        "#,
    )
    .bind(warehouse_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    code: &str,
    name: &str,
    address: Option<&str>,
    is_active: bool,
) -> Result<Warehouse, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO warehouses (code, name, address, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, name, address, is_active, created_at, updated_at
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(address)
    .bind(is_active)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    warehouse_id: Uuid,
    code: Option<&str>,
    name: Option<&str>,
    address: Option<&str>,
    is_active: Option<bool>,
) -> Result<Option<Warehouse>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE warehouses
            SET code = COALESCE($2, code),
                name = COALESCE($3, name),
                address = COALESCE($4, address),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, name, address, is_active, created_at, updated_at
        "#,
    )
    .bind(warehouse_id)
    .bind(code)
    .bind(name)
    .bind(address)
    .bind(is_active)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, warehouse_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(warehouse_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Whether any stock row of the warehouse holds a positive quantity
pub async fn has_stock<'e, E>(executor: E, warehouse_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM inventory WHERE warehouse_id = $1 AND quantity > 0)",
    )
    .bind(warehouse_id)
    .fetch_one(executor)
    .await
}

pub async fn is_invoiced<'e, E>(executor: E, warehouse_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invoices WHERE warehouse_id = $1)")
        .bind(warehouse_id)
        .fetch_one(executor)
        .await
}

/// Whether any stock movement was ever recorded in the warehouse
pub async fn has_movements<'e, E>(executor: E, warehouse_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM inventory_transactions WHERE warehouse_id = $1)",
    )
    .bind(warehouse_id)
    .fetch_one(executor)
    .await
}

pub async fn list_locations<'e, E>(
    executor: E,
    warehouse_id: Uuid,
) -> Result<Vec<WarehouseLocation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, warehouse_id, code, name, description, created_at, updated_at
            FROM warehouse_locations
            WHERE warehouse_id = $1
            ORDER BY code
        "#,
    )
    .bind(warehouse_id)
    .fetch_all(executor)
    .await
}

pub async fn find_location<'e, E>(
    executor: E,
    location_id: Uuid,
) -> Result<Option<WarehouseLocation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, warehouse_id, code, name, description, created_at, updated_at
            FROM warehouse_locations
            WHERE id = $1
        "#,
    )
    .bind(location_id)
    .fetch_optional(executor)
    .await
}

/// Whether `location_id` is a location of `warehouse_id`
pub async fn location_in_warehouse<'e, E>(
    executor: E,
    location_id: Uuid,
    warehouse_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM warehouse_locations WHERE id = $1 AND warehouse_id = $2)",
    )
    .bind(location_id)
    .bind(warehouse_id)
    .fetch_one(executor)
    .await
}

pub async fn create_location<'e, E>(
    executor: E,
    warehouse_id: Uuid,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<WarehouseLocation, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO warehouse_locations (warehouse_id, code, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, warehouse_id, code, name, description, created_at, updated_at
        "#,
    )
    .bind(warehouse_id)
    .bind(code)
    .bind(name)
    .bind(description)
    .fetch_one(executor)
    .await
}

pub async fn update_location<'e, E>(
    executor: E,
    location_id: Uuid,
    code: Option<&str>,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<WarehouseLocation>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE warehouse_locations
            SET code = COALESCE($2, code),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, warehouse_id, code, name, description, created_at, updated_at
        "#,
    )
    .bind(location_id)
    .bind(code)
    .bind(name)
    .bind(description)
    .fetch_optional(executor)
    .await
}

pub async fn location_has_stock<'e, E>(executor: E, location_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM inventory WHERE location_id = $1 AND quantity > 0)",
    )
    .bind(location_id)
    .fetch_one(executor)
    .await
}

pub async fn delete_location<'e, E>(executor: E, location_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM warehouse_locations WHERE id = $1")
        .bind(location_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_empty_location_stock<'e, E>(
    executor: E,
    location_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM inventory WHERE location_id = $1 AND quantity = 0")
        .bind(location_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
