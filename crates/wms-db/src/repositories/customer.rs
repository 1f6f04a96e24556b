use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Customer, CustomerFields};

/// Filters for the customer listing. `search` must already be normalized the
/// same way `search_text` is.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter<'a> {
    pub search: Option<&'a str>,
    pub group_id: Option<Uuid>,
}

/// `limit = None` returns every matching row.
pub async fn list<'e, E>(
    executor: E,
    filter: &CustomerFilter<'_>,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<Customer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT c.id, c.code, c.name, c.phone, c.email, c.address, c.tax_code,
                   c.group_id, g.name AS group_name, c.note, c.created_at, c.updated_at
            FROM customers c
            LEFT JOIN customer_groups g ON g.id = c.group_id
            WHERE ($1::text IS NULL OR NOT EXISTS (
                SELECT 1 FROM unnest(string_to_array($1, ' ')) AS term
                WHERE strpos(c.search_text, term) = 0
            ))
              AND ($2::uuid IS NULL OR c.group_id = $2)
            ORDER BY c.created_at DESC, c.code
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.search)
    .bind(filter.group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &CustomerFilter<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM customers c
            WHERE ($1::text IS NULL OR NOT EXISTS (
                SELECT 1 FROM unnest(string_to_array($1, ' ')) AS term
                WHERE strpos(c.search_text, term) = 0
            ))
              AND ($2::uuid IS NULL OR c.group_id = $2)
        "#,
    )
    .bind(filter.search)
    .bind(filter.group_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, customer_id: Uuid) -> Result<Option<Customer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT c.id, c.code, c.name, c.phone, c.email, c.address, c.tax_code,
                   c.group_id, g.name AS group_name, c.note, c.created_at, c.updated_at
            FROM customers c
            LEFT JOIN customer_groups g ON g.id = c.group_id
            WHERE c.id = $1
        "#,
    )
    .bind(customer_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    fields: &CustomerFields,
    search_text: &str,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO customers (code, name, phone, email, address, tax_code, group_id, note, search_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
        "#,
    )
    .bind(&fields.code)
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(&fields.tax_code)
    .bind(fields.group_id)
    .bind(&fields.note)
    .bind(search_text)
    .fetch_one(executor)
    .await
}

/// Overwrite every editable column of the customer.
pub async fn update<'e, E>(
    executor: E,
    customer_id: Uuid,
    fields: &CustomerFields,
    search_text: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE customers
            SET code = $2, name = $3, phone = $4, email = $5, address = $6,
                tax_code = $7, group_id = $8, note = $9, search_text = $10,
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(customer_id)
    .bind(&fields.code)
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(&fields.tax_code)
    .bind(fields.group_id)
    .bind(&fields.note)
    .bind(search_text)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, customer_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(customer_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn has_invoices<'e, E>(executor: E, customer_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invoices WHERE customer_id = $1)")
        .bind(customer_id)
        .fetch_one(executor)
        .await
}

pub async fn exists<'e, E>(executor: E, customer_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
        .bind(customer_id)
        .fetch_one(executor)
        .await
}
