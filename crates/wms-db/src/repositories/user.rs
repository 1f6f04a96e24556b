use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::User;

pub async fn list<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT u.id, u.username, u.email, u.full_name, u.role_id, r.name AS role_name,
                   u.is_active, u.created_at, u.updated_at
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            ORDER BY u.created_at
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, user_id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT u.id, u.username, u.email, u.full_name, u.role_id, r.name AS role_name,
                   u.is_active, u.created_at, u.updated_at
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await
}

/// Whether another user already uses `email` or `username`.
pub async fn identity_taken<'e, E>(
    executor: E,
    email: Option<&str>,
    username: Option<&str>,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE (lower(email) = lower($1) OR username = $2)
                  AND ($3::uuid IS NULL OR id <> $3)
            )
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(exclude_id)
    .fetch_one(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
    role_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO users (username, email, password_hash, full_name, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(role_id)
    .fetch_one(executor)
    .await
}

/// Partial update; `None` leaves the column unchanged.
pub async fn update<'e, E>(
    executor: E,
    user_id: Uuid,
    email: Option<&str>,
    full_name: Option<&str>,
    role_id: Option<Uuid>,
    is_active: Option<bool>,
    password_hash: Option<&str>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE users
            SET email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                role_id = COALESCE($4, role_id),
                is_active = COALESCE($5, is_active),
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(full_name)
    .bind(role_id)
    .bind(is_active)
    .bind(password_hash)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, user_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Ids of the roles assigned on top of the primary role.
pub async fn additional_role_ids<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn clear_additional_roles<'e, E>(executor: E, user_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn add_additional_roles<'e, E>(
    executor: E,
    user_id: Uuid,
    role_ids: &[Uuid],
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role_ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
