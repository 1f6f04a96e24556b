use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::CustomerGroup;

pub async fn list<'e, E>(executor: E) -> Result<Vec<CustomerGroup>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT g.id, g.code, g.name, g.description,
                   (SELECT COUNT(*) FROM customers c WHERE c.group_id = g.id) AS customer_count,
                   g.created_at, g.updated_at
            FROM customer_groups g
            ORDER BY g.code
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    group_id: Uuid,
) -> Result<Option<CustomerGroup>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT g.id, g.code, g.name, g.description,
                   (SELECT COUNT(*) FROM customers c WHERE c.group_id = g.id) AS customer_count,
                   g.created_at, g.updated_at
            FROM customer_groups g
            WHERE g.id = $1
        "#,
    )
    .bind(group_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO customer_groups (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING id
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(description)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    group_id: Uuid,
    code: Option<&str>,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE customer_groups
            SET code = COALESCE($2, code),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(group_id)
    .bind(code)
    .bind(name)
    .bind(description)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, group_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM customer_groups WHERE id = $1")
        .bind(group_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn exists<'e, E>(executor: E, group_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customer_groups WHERE id = $1)")
        .bind(group_id)
        .fetch_one(executor)
        .await
}
