use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::ActivityLog;

#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter<'a> {
    pub entity_type: Option<&'a str>,
    pub entity_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
}

pub async fn record<'e, E>(
    executor: E,
    actor_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Option<Uuid>,
    details: &serde_json::Value,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO activity_logs (actor_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(actor_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(details)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list<'e, E>(
    executor: E,
    filter: &ActivityLogFilter<'_>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ActivityLog>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, actor_id, action, entity_type, entity_id, details, created_at
            FROM activity_logs
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR entity_id = $2)
              AND ($3::uuid IS NULL OR actor_id = $3)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.entity_type)
    .bind(filter.entity_id)
    .bind(filter.actor_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &ActivityLogFilter<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM activity_logs
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR entity_id = $2)
              AND ($3::uuid IS NULL OR actor_id = $3)
        "#,
    )
    .bind(filter.entity_type)
    .bind(filter.entity_id)
    .bind(filter.actor_id)
    .fetch_one(executor)
    .await
}
