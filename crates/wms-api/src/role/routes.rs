use std::collections::BTreeSet;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde_json::json;
use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use wms_db::{
    models::{Permission as PermissionRow, Role},
    repositories::role as role_repo,
};

use super::model::{CreateRoleRequest, RoleDetail, SetRolePermissionsRequest, UpdateRoleRequest};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    validation::require_changes,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/permissions", get(list_permissions))
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/{id}",
            get(get_role).patch(update_role).delete(delete_role),
        )
        .route("/roles/{id}/permissions", put(set_role_permissions))
}

async fn list_permissions(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<PermissionRow>>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesRead]).await?;

    Ok(Json(role_repo::list_permissions(&state.pool).await?))
}

async fn list_roles(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Role>>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesRead]).await?;

    Ok(Json(role_repo::list(&state.pool).await?))
}

async fn get_role(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleDetail>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesRead]).await?;

    let role = role_repo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role"))?;
    let permissions = role_repo::role_permissions(&state.pool, role_id).await?;

    Ok(Json(RoleDetail { role, permissions }))
}

async fn create_role(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleDetail>), ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesCreate]).await?;
    payload.validate()?;

    let mut tx = state.pool.begin().await?;

    let role = role_repo::create(
        &mut *tx,
        payload.name.trim(),
        payload.description.as_deref(),
    )
    .await?;
    replace_permissions(&mut tx, role.id, &payload.permission_codes).await?;
    let permissions = role_repo::role_permissions(&mut *tx, role.id).await?;

    tx.commit().await?;

    tracing::info!(role_id = %role.id, name = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(RoleDetail { role, permissions })))
}

async fn update_role(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Role>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesUpdate]).await?;
    payload.validate()?;
    require_changes(payload.name.is_some() || payload.description.is_some())?;

    let role = role_repo::update(
        &state.pool,
        role_id,
        payload.name.as_deref().map(str::trim),
        payload.description.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Role"))?;

    Ok(Json(role))
}

async fn delete_role(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesDelete]).await?;

    let role = role_repo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role"))?;

    if role.name == role_repo::ADMIN_ROLE {
        return Err(ApiError::BadRequest(
            "The admin role cannot be deleted".to_string(),
        ));
    }

    let users = role_repo::count_primary_users(&state.pool, role_id).await?;
    if users > 0 {
        return Err(ApiError::BadRequest(format!(
            "Role is the primary role of {users} user(s)"
        )));
    }

    role_repo::delete(&state.pool, role_id).await?;

    Ok(Json(json!({
        "message": "Role deleted successfully",
        "id": role_id
    })))
}

async fn set_role_permissions(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> Result<Json<RoleDetail>, ApiError> {
    auth_user.require(&state.pool, &[Permission::RolesUpdate]).await?;

    let mut tx = state.pool.begin().await?;

    let role = role_repo::find_by_id(&mut *tx, role_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role"))?;

    role_repo::clear_permissions(&mut *tx, role_id).await?;
    replace_permissions(&mut tx, role_id, &payload.permission_codes).await?;
    let permissions = role_repo::role_permissions(&mut *tx, role_id).await?;

    tx.commit().await?;

    tracing::info!(
        role_id = %role_id,
        count = permissions.len(),
        "Role permissions replaced"
    );

    Ok(Json(RoleDetail { role, permissions }))
}

/// Attach the permissions named by `codes`. Unknown codes fail the request.
async fn replace_permissions(
    conn: &mut PgConnection,
    role_id: Uuid,
    codes: &[String],
) -> Result<(), ApiError> {
    let requested = codes
        .iter()
        .map(|code| code.trim().to_string())
        .collect::<BTreeSet<_>>();
    if requested.is_empty() {
        return Ok(());
    }

    let requested = requested.into_iter().collect::<Vec<_>>();
    let found = role_repo::permission_ids_by_codes(&mut *conn, &requested).await?;

    if found.len() != requested.len() {
        let known = found.iter().map(|(_, code)| code.as_str()).collect::<BTreeSet<_>>();
        let unknown = requested
            .iter()
            .filter(|code| !known.contains(code.as_str()))
            .map(String::as_str)
            .collect::<Vec<_>>();
        return Err(ApiError::BadRequest(format!(
            "Unknown permission codes: {}",
            unknown.join(", ")
        )));
    }

    let ids = found.into_iter().map(|(id, _)| id).collect::<Vec<_>>();
    role_repo::add_permissions(&mut *conn, role_id, &ids).await?;

    Ok(())
}
