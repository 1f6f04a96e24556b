use std::collections::BTreeSet;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use wms_db::{
    models::User,
    repositories::{activity_log, role as role_repo, user as user_repo},
};

use super::model::{CreateUserRequest, SetUserRolesRequest, UpdateUserRequest, UserDetail};
use crate::{
    ApiState,
    auth::{AuthUser, Permission, password::hash_password, refresh_token},
    error::ApiError,
    validation::{require_changes, trimmed},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{id}/roles", put(set_user_roles))
}

async fn ensure_role_exists(pool: &PgPool, role_id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(role_id) = role_id
        && role_repo::find_by_id(pool, role_id).await?.is_none()
    {
        return Err(ApiError::BadRequest("Role does not exist".to_string()));
    }
    Ok(())
}

async fn load_detail(pool: &PgPool, user_id: Uuid) -> Result<UserDetail, ApiError> {
    let user = user_repo::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    let additional_role_ids = user_repo::additional_role_ids(pool, user_id).await?;

    Ok(UserDetail {
        user,
        additional_role_ids,
    })
}

async fn list_users(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<User>>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersRead]).await?;

    Ok(Json(user_repo::list(&state.pool).await?))
}

async fn get_user(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserDetail>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersRead]).await?;

    Ok(Json(load_detail(&state.pool, user_id).await?))
}

async fn create_user(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDetail>), ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersCreate]).await?;
    payload.validate()?;

    let email = payload.email.trim();
    let username = payload.username.trim();

    if user_repo::identity_taken(&state.pool, Some(email), Some(username), None).await? {
        return Err(ApiError::BadRequest(
            "Email or username already in use".to_string(),
        ));
    }
    ensure_role_exists(&state.pool, payload.role_id).await?;

    let password_hash = hash_password(&payload.password, state.bcrypt_cost).await?;

    let additional = payload
        .additional_role_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    let mut tx = state.pool.begin().await?;

    let user_id = user_repo::create(
        &mut *tx,
        username,
        email,
        &password_hash,
        trimmed(payload.full_name.as_deref()),
        payload.role_id,
    )
    .await?;
    if !additional.is_empty() {
        user_repo::add_additional_roles(&mut *tx, user_id, &additional).await?;
    }
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "user.created",
        "user",
        Some(user_id),
        &json!({ "username": username, "email": email }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%user_id, username, "User created");

    Ok((StatusCode::CREATED, Json(load_detail(&state.pool, user_id).await?)))
}

async fn update_user(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserDetail>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersUpdate]).await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;

    if payload.is_active == Some(false) && user_id == auth_user.user_id {
        return Err(ApiError::BadRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let email = payload.email.as_deref().map(str::trim);
    if let Some(email) = email
        && user_repo::identity_taken(&state.pool, Some(email), None, Some(user_id)).await?
    {
        return Err(ApiError::BadRequest("Email already in use".to_string()));
    }
    ensure_role_exists(&state.pool, payload.role_id).await?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hash_password(password, state.bcrypt_cost).await?),
        None => None,
    };

    let updated = user_repo::update(
        &state.pool,
        user_id,
        email,
        payload.full_name.as_deref(),
        payload.role_id,
        payload.is_active,
        password_hash.as_deref(),
    )
    .await?;
    if !updated {
        return Err(ApiError::not_found("User"));
    }

    // Sessions end when the account is disabled or its password changes
    if payload.is_active == Some(false) || password_hash.is_some() {
        let revoked = refresh_token::revoke_all_user_tokens(&state.pool, user_id).await?;
        tracing::info!(%user_id, revoked, "Revoked refresh tokens");
    }

    Ok(Json(load_detail(&state.pool, user_id).await?))
}

async fn delete_user(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersDelete]).await?;

    if user_id == auth_user.user_id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    if user_repo::delete(&mut *tx, user_id).await? == 0 {
        return Err(ApiError::not_found("User"));
    }
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "user.deleted",
        "user",
        Some(user_id),
        &json!({}),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "User deleted successfully",
        "id": user_id
    })))
}

async fn set_user_roles(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetUserRolesRequest>,
) -> Result<Json<UserDetail>, ApiError> {
    auth_user.require(&state.pool, &[Permission::UsersUpdate]).await?;

    if user_repo::find_by_id(&state.pool, user_id).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let role_ids = payload
        .role_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    let mut tx = state.pool.begin().await?;

    user_repo::clear_additional_roles(&mut *tx, user_id).await?;
    if !role_ids.is_empty() {
        // Unknown role ids fail the foreign key and surface as 400
        user_repo::add_additional_roles(&mut *tx, user_id, &role_ids).await?;
    }

    tx.commit().await?;

    Ok(Json(load_detail(&state.pool, user_id).await?))
}
