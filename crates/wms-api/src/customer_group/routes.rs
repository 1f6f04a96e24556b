use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use wms_db::{
    models::CustomerGroup,
    repositories::{activity_log, customer_group as group_repo},
};

use super::model::{CreateCustomerGroupRequest, UpdateCustomerGroupRequest};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    validation::{require_changes, trimmed},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/customer-groups", get(list_groups).post(create_group))
        .route(
            "/customer-groups/{id}",
            get(get_group).patch(update_group).delete(delete_group),
        )
}

async fn list_groups(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<CustomerGroup>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomerGroupsRead])
        .await?;

    Ok(Json(group_repo::list(&state.pool).await?))
}

async fn get_group(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<CustomerGroup>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomerGroupsRead])
        .await?;

    let group = group_repo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer group"))?;

    Ok(Json(group))
}

async fn create_group(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateCustomerGroupRequest>,
) -> Result<(StatusCode, Json<CustomerGroup>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomerGroupsCreate])
        .await?;
    payload.validate()?;

    let group_id = group_repo::create(
        &state.pool,
        payload.code.trim(),
        payload.name.trim(),
        trimmed(payload.description.as_deref()),
    )
    .await?;

    activity_log::record(
        &state.pool,
        Some(auth_user.user_id),
        "customer_group.created",
        "customer_group",
        Some(group_id),
        &json!({ "code": payload.code.trim() }),
    )
    .await?;

    let group = group_repo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer group"))?;

    Ok((StatusCode::CREATED, Json(group)))
}

async fn update_group(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerGroupRequest>,
) -> Result<Json<CustomerGroup>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomerGroupsUpdate])
        .await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;

    let updated = group_repo::update(
        &state.pool,
        group_id,
        payload.code.as_deref().map(str::trim),
        payload.name.as_deref().map(str::trim),
        payload.description.as_deref(),
    )
    .await?;
    if !updated {
        return Err(ApiError::not_found("Customer group"));
    }

    let group = group_repo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer group"))?;

    Ok(Json(group))
}

async fn delete_group(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomerGroupsDelete])
        .await?;

    let group = group_repo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer group"))?;

    if group.customer_count > 0 {
        return Err(ApiError::BadRequest(format!(
            "Customer group still has {} customer(s)",
            group.customer_count
        )));
    }

    let mut tx = state.pool.begin().await?;

    group_repo::delete(&mut *tx, group_id).await?;
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "customer_group.deleted",
        "customer_group",
        Some(group_id),
        &json!({ "code": group.code }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Customer group deleted successfully",
        "id": group_id
    })))
}
