//! Read access to the audit trail written by the mutating endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use wms_db::{
    models::ActivityLog,
    repositories::activity_log::{self as activity_repo, ActivityLogFilter},
};

use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    pagination::{Page, Paginated},
    validation::trimmed,
};

#[derive(Debug, Default, Deserialize)]
pub struct ActivityLogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/activity-logs", get(list_activity_logs))
}

async fn list_activity_logs(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<Json<Paginated<ActivityLog>>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersRead]).await?;

    let page = Page::new(query.page, query.limit)?;
    let filter = ActivityLogFilter {
        entity_type: trimmed(query.entity_type.as_deref()),
        entity_id: query.entity_id,
        actor_id: query.actor_id,
    };

    let total = activity_repo::count(&state.pool, &filter).await?;
    let logs = activity_repo::list(&state.pool, &filter, page.limit, page.offset()).await?;

    Ok(Json(page.wrap(logs, total)))
}
