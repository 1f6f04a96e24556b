use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use wms_db::{
    models::{Warehouse, WarehouseLocation},
    repositories::{activity_log, warehouse as warehouse_repo},
};

use super::model::{
    CreateLocationRequest, CreateWarehouseRequest, UpdateLocationRequest, UpdateWarehouseRequest,
};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    validation::{require_changes, trimmed},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/warehouses", get(list_warehouses).post(create_warehouse))
        .route(
            "/warehouses/{id}",
            get(get_warehouse)
                .patch(update_warehouse)
                .delete(delete_warehouse),
        )
        .route(
            "/warehouses/{id}/locations",
            get(list_locations).post(create_location),
        )
        .route(
            "/warehouse-locations/{id}",
            patch(update_location).delete(delete_location),
        )
}

async fn list_warehouses(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Warehouse>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesRead])
        .await?;

    Ok(Json(warehouse_repo::list(&state.pool).await?))
}

async fn get_warehouse(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<Warehouse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesRead])
        .await?;

    let warehouse = warehouse_repo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Warehouse"))?;

    Ok(Json(warehouse))
}

async fn create_warehouse(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<(StatusCode, Json<Warehouse>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesCreate])
        .await?;
    payload.validate()?;

    let warehouse = warehouse_repo::create(
        &state.pool,
        payload.code.trim(),
        payload.name.trim(),
        trimmed(payload.address.as_deref()),
        payload.is_active.unwrap_or(true),
    )
    .await?;

    activity_log::record(
        &state.pool,
        Some(auth_user.user_id),
        "warehouse.created",
        "warehouse",
        Some(warehouse.id),
        &json!({ "code": warehouse.code }),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(warehouse)))
}

async fn update_warehouse(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(warehouse_id): Path<Uuid>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> Result<Json<Warehouse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesUpdate])
        .await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;

    let warehouse = warehouse_repo::update(
        &state.pool,
        warehouse_id,
        payload.code.as_deref().map(str::trim),
        payload.name.as_deref().map(str::trim),
        payload.address.as_deref(),
        payload.is_active,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Warehouse"))?;

    Ok(Json(warehouse))
}

async fn delete_warehouse(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesDelete])
        .await?;

    let warehouse = warehouse_repo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Warehouse"))?;

    if warehouse_repo::has_stock(&state.pool, warehouse_id).await? {
        return Err(ApiError::BadRequest(
            "Warehouse still holds stock and cannot be deleted".to_string(),
        ));
    }
    if warehouse_repo::is_invoiced(&state.pool, warehouse_id).await? {
        return Err(ApiError::BadRequest(
            "Warehouse is referenced by invoices and cannot be deleted".to_string(),
        ));
    }
    if warehouse_repo::has_movements(&state.pool, warehouse_id).await? {
        return Err(ApiError::BadRequest(
            "Warehouse has stock history and cannot be deleted; deactivate it instead".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    warehouse_repo::delete(&mut *tx, warehouse_id).await?;
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "warehouse.deleted",
        "warehouse",
        Some(warehouse_id),
        &json!({ "code": warehouse.code }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Warehouse deleted successfully",
        "id": warehouse_id
    })))
}

async fn list_locations(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<Vec<WarehouseLocation>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesRead])
        .await?;

    if warehouse_repo::find_by_id(&state.pool, warehouse_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Warehouse"));
    }

    Ok(Json(
        warehouse_repo::list_locations(&state.pool, warehouse_id).await?,
    ))
}

async fn create_location(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(warehouse_id): Path<Uuid>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<WarehouseLocation>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesUpdate])
        .await?;
    payload.validate()?;

    if warehouse_repo::find_by_id(&state.pool, warehouse_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Warehouse"));
    }

    let location = warehouse_repo::create_location(
        &state.pool,
        warehouse_id,
        payload.code.trim(),
        payload.name.trim(),
        trimmed(payload.description.as_deref()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

async fn update_location(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<WarehouseLocation>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesUpdate])
        .await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;

    let location = warehouse_repo::update_location(
        &state.pool,
        location_id,
        payload.code.as_deref().map(str::trim),
        payload.name.as_deref().map(str::trim),
        payload.description.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Location"))?;

    Ok(Json(location))
}

async fn delete_location(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::WarehousesUpdate])
        .await?;

    if warehouse_repo::find_location(&state.pool, location_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Location"));
    }
    if warehouse_repo::location_has_stock(&state.pool, location_id).await? {
        return Err(ApiError::BadRequest(
            "Location still holds stock and cannot be deleted".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    warehouse_repo::delete_empty_location_stock(&mut *tx, location_id).await?;
    warehouse_repo::delete_location(&mut *tx, location_id).await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Location deleted successfully",
        "id": location_id
    })))
}
