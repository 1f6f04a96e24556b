use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{FacebookActivityLog, FacebookComment, FacebookMessage, FacebookPage, FacebookUser};

/// Insert or refresh a page keyed on its Facebook id.
pub async fn upsert_page<'e, E>(
    executor: E,
    page_id: &str,
    name: &str,
    category: Option<&str>,
    access_token: Option<&str>,
) -> Result<FacebookPage, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO facebook_pages (page_id, name, category, access_token)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (page_id) DO UPDATE
            SET name = EXCLUDED.name,
                category = EXCLUDED.category,
                access_token = COALESCE(EXCLUDED.access_token, facebook_pages.access_token),
                updated_at = NOW()
            RETURNING id, page_id, name, category, access_token, last_synced_at, created_at, updated_at
        "#,
    )
    .bind(page_id)
    .bind(name)
    .bind(category)
    .bind(access_token)
    .fetch_one(executor)
    .await
}

pub async fn list_pages<'e, E>(executor: E) -> Result<Vec<FacebookPage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, page_id, name, category, access_token, last_synced_at, created_at, updated_at
            FROM facebook_pages
            ORDER BY name
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_page<'e, E>(executor: E, id: Uuid) -> Result<Option<FacebookPage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, page_id, name, category, access_token, last_synced_at, created_at, updated_at
            FROM facebook_pages
            WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn mark_page_synced<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE facebook_pages SET last_synced_at = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns `true` when the user was inserted rather than updated.
pub async fn upsert_user<'e, E>(
    executor: E,
    fb_user_id: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO facebook_users (fb_user_id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (fb_user_id) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, facebook_users.name),
                email = COALESCE(EXCLUDED.email, facebook_users.email),
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(fb_user_id)
    .bind(name)
    .bind(email)
    .fetch_one(executor)
    .await
}

/// Returns `true` when the message was inserted rather than updated.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_message<'e, E>(
    executor: E,
    message_id: &str,
    page_id: Uuid,
    conversation_id: &str,
    sender_fb_id: Option<&str>,
    sender_name: Option<&str>,
    message: Option<&str>,
    created_time: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO facebook_messages
                (message_id, page_id, conversation_id, sender_fb_id, sender_name, message, created_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (message_id) DO UPDATE
            SET sender_name = COALESCE(EXCLUDED.sender_name, facebook_messages.sender_name),
                message = EXCLUDED.message
            RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(message_id)
    .bind(page_id)
    .bind(conversation_id)
    .bind(sender_fb_id)
    .bind(sender_name)
    .bind(message)
    .bind(created_time)
    .fetch_one(executor)
    .await
}

/// Returns `true` when the comment was inserted rather than updated.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_comment<'e, E>(
    executor: E,
    comment_id: &str,
    page_id: Uuid,
    post_id: &str,
    parent_comment_id: Option<&str>,
    from_fb_id: Option<&str>,
    from_name: Option<&str>,
    message: Option<&str>,
    created_time: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO facebook_comments
                (comment_id, page_id, post_id, parent_comment_id, from_fb_id, from_name, message, created_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (comment_id) DO UPDATE
            SET from_name = COALESCE(EXCLUDED.from_name, facebook_comments.from_name),
                message = EXCLUDED.message
            RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(comment_id)
    .bind(page_id)
    .bind(post_id)
    .bind(parent_comment_id)
    .bind(from_fb_id)
    .bind(from_name)
    .bind(message)
    .bind(created_time)
    .fetch_one(executor)
    .await
}

pub async fn list_messages<'e, E>(
    executor: E,
    page_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<FacebookMessage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, message_id, page_id, conversation_id, sender_fb_id, sender_name, message, created_time
            FROM facebook_messages
            WHERE page_id = $1
            ORDER BY created_time DESC, id
            LIMIT $2 OFFSET $3
        "#,
    )
    .bind(page_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count_messages<'e, E>(executor: E, page_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM facebook_messages WHERE page_id = $1")
        .bind(page_id)
        .fetch_one(executor)
        .await
}

pub async fn list_comments<'e, E>(
    executor: E,
    page_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<FacebookComment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, comment_id, page_id, post_id, parent_comment_id, from_fb_id, from_name,
                   message, created_time
            FROM facebook_comments
            WHERE page_id = $1
            ORDER BY created_time DESC, id
            LIMIT $2 OFFSET $3
        "#,
    )
    .bind(page_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count_comments<'e, E>(executor: E, page_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM facebook_comments WHERE page_id = $1")
        .bind(page_id)
        .fetch_one(executor)
        .await
}

pub async fn list_users<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<FacebookUser>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, fb_user_id, name, email, created_at, updated_at
            FROM facebook_users
            ORDER BY updated_at DESC, id
            LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count_users<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM facebook_users")
        .fetch_one(executor)
        .await
}

pub async fn log_activity<'e, E>(
    executor: E,
    page_id: Option<Uuid>,
    action: &str,
    status: &str,
    message: Option<&str>,
    details: &serde_json::Value,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO facebook_activity_logs (page_id, action, status, message, details)
            VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(page_id)
    .bind(action)
    .bind(status)
    .bind(message)
    .bind(details)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_activity<'e, E>(
    executor: E,
    page_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<FacebookActivityLog>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, page_id, action, status, message, details, created_at
            FROM facebook_activity_logs
            WHERE ($1::uuid IS NULL OR page_id = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
        "#,
    )
    .bind(page_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count_activity<'e, E>(executor: E, page_id: Option<Uuid>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM facebook_activity_logs WHERE ($1::uuid IS NULL OR page_id = $1)",
    )
    .bind(page_id)
    .fetch_one(executor)
    .await
}
