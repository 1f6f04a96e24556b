use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Product, ProductAttribute, ProductFields};

#[derive(Debug, Clone, Default)]
pub struct ProductFilter<'a> {
    /// Normalized search term; every word must occur in `search_text`
    pub search: Option<&'a str>,
    pub is_active: Option<bool>,
}

/// `limit = None` returns every matching row.
pub async fn list<'e, E>(
    executor: E,
    filter: &ProductFilter<'_>,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<Product>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT p.id, p.sku, p.name, p.unit, p.description, p.price, p.cost_price, p.is_active,
                   COALESCE((SELECT SUM(i.quantity) FROM inventory i WHERE i.product_id = p.id), 0)::BIGINT
                       AS stock_quantity,
                   p.created_at, p.updated_at
            FROM products p
            WHERE ($1::text IS NULL OR NOT EXISTS (
                SELECT 1 FROM unnest(string_to_array($1, ' ')) AS term
                WHERE strpos(p.search_text, term) = 0
            ))
              AND ($2::boolean IS NULL OR p.is_active = $2)
            ORDER BY p.created_at DESC, p.sku
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.search)
    .bind(filter.is_active)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &ProductFilter<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM products p
            WHERE ($1::text IS NULL OR NOT EXISTS (
                SELECT 1 FROM unnest(string_to_array($1, ' ')) AS term
                WHERE strpos(p.search_text, term) = 0
            ))
              AND ($2::boolean IS NULL OR p.is_active = $2)
        "#,
    )
    .bind(filter.search)
    .bind(filter.is_active)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, product_id: Uuid) -> Result<Option<Product>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT p.id, p.sku, p.name, p.unit, p.description, p.price, p.cost_price, p.is_active,
                   COALESCE((SELECT SUM(i.quantity) FROM inventory i WHERE i.product_id = p.id), 0)::BIGINT
                       AS stock_quantity,
                   p.created_at, p.updated_at
            FROM products p
            WHERE p.id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await
}

/// Current list price of an active product.
pub async fn find_active_price<'e, E>(
    executor: E,
    product_id: Uuid,
) -> Result<Option<Decimal>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT price FROM products WHERE id = $1 AND is_active")
        .bind(product_id)
        .fetch_optional(executor)
        .await
}

pub async fn exists<'e, E>(executor: E, product_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(executor)
        .await
}

pub async fn create<'e, E>(
    executor: E,
    fields: &ProductFields,
    search_text: &str,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO products (sku, name, unit, description, price, cost_price, is_active, search_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
        "#,
    )
    .bind(&fields.sku)
    .bind(&fields.name)
    .bind(&fields.unit)
    .bind(&fields.description)
    .bind(fields.price)
    .bind(fields.cost_price)
    .bind(fields.is_active)
    .bind(search_text)
    .fetch_one(executor)
    .await
}

/// Overwrite every editable column of the product.
pub async fn update<'e, E>(
    executor: E,
    product_id: Uuid,
    fields: &ProductFields,
    search_text: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE products
            SET sku = $2, name = $3, unit = $4, description = $5, price = $6,
                cost_price = $7, is_active = $8, search_text = $9, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(product_id)
    .bind(&fields.sku)
    .bind(&fields.name)
    .bind(&fields.unit)
    .bind(&fields.description)
    .bind(fields.price)
    .bind(fields.cost_price)
    .bind(fields.is_active)
    .bind(search_text)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, product_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Whether any invoice line refers to the product
pub async fn is_invoiced<'e, E>(executor: E, product_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invoice_items WHERE product_id = $1)")
        .bind(product_id)
        .fetch_one(executor)
        .await
}

/// Whether any stock movement was ever recorded for the product
pub async fn has_movements<'e, E>(executor: E, product_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM inventory_transactions WHERE product_id = $1)",
    )
    .bind(product_id)
    .fetch_one(executor)
    .await
}

pub async fn attributes<'e, E>(
    executor: E,
    product_id: Uuid,
) -> Result<Vec<ProductAttribute>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, product_id, name, value
            FROM product_attributes
            WHERE product_id = $1
            ORDER BY name
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

pub async fn clear_attributes<'e, E>(executor: E, product_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM product_attributes WHERE product_id = $1")
        .bind(product_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_attributes<'e, E>(
    executor: E,
    product_id: Uuid,
    names: &[String],
    values: &[String],
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO product_attributes (product_id, name, value)
            SELECT $1, name, value
            FROM UNNEST($2::text[], $3::text[]) AS a(name, value)
        "#,
    )
    .bind(product_id)
    .bind(names)
    .bind(values)
    .execute(executor)
    .await?;
    Ok(())
}
