use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Permission, Role};

/// Name of the built-in role that holds every permission
pub const ADMIN_ROLE: &str = "admin";

pub async fn list<'e, E>(executor: E) -> Result<Vec<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, name, description, created_at, updated_at
            FROM roles
            ORDER BY name
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, role_id: Uuid) -> Result<Option<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, name, description, created_at, updated_at
            FROM roles
            WHERE id = $1
        "#,
    )
    .bind(role_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E>(
    executor: E,
    name: &str,
    description: Option<&str>,
) -> Result<Role, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    role_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(role_id)
    .bind(name)
    .bind(description)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, role_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Number of users holding the role as their primary role
pub async fn count_primary_users<'e, E>(executor: E, role_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
        .bind(role_id)
        .fetch_one(executor)
        .await
}

pub async fn list_permissions<'e, E>(executor: E) -> Result<Vec<Permission>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT id, code, description FROM permissions ORDER BY code")
        .fetch_all(executor)
        .await
}

pub async fn role_permissions<'e, E>(executor: E, role_id: Uuid) -> Result<Vec<Permission>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT p.id, p.code, p.description
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.code
        "#,
    )
    .bind(role_id)
    .fetch_all(executor)
    .await
}

/// Ids of the given permission codes; unknown codes are absent from the result.
pub async fn permission_ids_by_codes<'e, E>(
    executor: E,
    codes: &[String],
) -> Result<Vec<(Uuid, String)>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT id, code FROM permissions WHERE code = ANY($1)")
        .bind(codes)
        .fetch_all(executor)
        .await
}

pub async fn clear_permissions<'e, E>(executor: E, role_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn add_permissions<'e, E>(
    executor: E,
    role_id: Uuid,
    permission_ids: &[Uuid],
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(executor)
    .await?;
    Ok(())
}

/// Permission codes granted by the user's primary role.
pub async fn primary_permission_codes<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT p.code
            FROM users u
            JOIN role_permissions rp ON rp.role_id = u.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Permission codes granted by the user's additional roles.
pub async fn additional_permission_codes<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT p.code
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
