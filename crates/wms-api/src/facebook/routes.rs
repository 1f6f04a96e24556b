use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use wms_db::{
    models::{FacebookActivityLog, FacebookComment, FacebookMessage, FacebookPage, FacebookUser},
    repositories::facebook as facebook_repo,
};

use super::sync::{self, PageSyncCounts, SyncSummary};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    pagination::{Page, Paginated},
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub page_id: Option<Uuid>,
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/facebook/sync", post(sync_all))
        .route("/facebook/pages", get(list_pages))
        .route("/facebook/pages/{id}/sync", post(sync_page))
        .route("/facebook/pages/{id}/messages", get(list_messages))
        .route("/facebook/pages/{id}/comments", get(list_comments))
        .route("/facebook/users", get(list_users))
        .route("/facebook/activity-logs", get(list_activity))
}

async fn find_page(state: &ApiState, id: Uuid) -> Result<FacebookPage, ApiError> {
    facebook_repo::find_page(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Facebook page"))
}

async fn sync_all(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<SyncSummary>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookSync])
        .await?;

    let token = state
        .facebook
        .user_access_token
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Facebook user access token is not configured".to_string()))?;

    let summary = sync::sync_all(&state.pool, &state.graph, token).await?;

    Ok(Json(summary))
}

async fn sync_page(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageSyncCounts>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookSync])
        .await?;

    let page = find_page(&state, id).await?;
    let counts = sync::sync_page(&state.pool, &state.graph, &page).await?;

    Ok(Json(counts))
}

async fn list_pages(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<FacebookPage>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookRead])
        .await?;

    Ok(Json(facebook_repo::list_pages(&state.pool).await?))
}

async fn list_messages(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FacebookMessage>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    find_page(&state, id).await?;

    let total = facebook_repo::count_messages(&state.pool, id).await?;
    let messages =
        facebook_repo::list_messages(&state.pool, id, page.limit, page.offset()).await?;

    Ok(Json(page.wrap(messages, total)))
}

async fn list_comments(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FacebookComment>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    find_page(&state, id).await?;

    let total = facebook_repo::count_comments(&state.pool, id).await?;
    let comments =
        facebook_repo::list_comments(&state.pool, id, page.limit, page.offset()).await?;

    Ok(Json(page.wrap(comments, total)))
}

async fn list_users(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FacebookUser>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;

    let total = facebook_repo::count_users(&state.pool).await?;
    let users = facebook_repo::list_users(&state.pool, page.limit, page.offset()).await?;

    Ok(Json(page.wrap(users, total)))
}

async fn list_activity(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Paginated<FacebookActivityLog>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::FacebookRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;

    let total = facebook_repo::count_activity(&state.pool, query.page_id).await?;
    let logs =
        facebook_repo::list_activity(&state.pool, query.page_id, page.limit, page.offset())
            .await?;

    Ok(Json(page.wrap(logs, total)))
}
