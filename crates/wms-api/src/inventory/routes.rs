use axum::{
    Json, Router,
    extract::{Query, State},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use wms_core::{MovementKind, csv::CsvWriter};
use wms_db::{
    models::{InventoryItem, InventoryTransaction},
    repositories::{
        activity_log,
        inventory::{self as inventory_repo, InventoryFilter, TransactionFilter},
    },
};

use super::{
    model::{
        AdjustStockRequest, InventoryQuery, MovementResponse, StockMovementRequest,
        TransactionQuery, TransferResponse, TransferStockRequest,
    },
    service::{Movement, MovementOutcome, apply_movement, validate_slot},
};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    export::{csv_response, format_timestamp},
    metrics,
    pagination::{Page, Paginated},
    validation::trimmed,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route("/inventory/export", get(export_inventory))
        .route("/inventory/transactions", get(list_transactions))
        .route("/inventory/receive", post(receive_stock))
        .route("/inventory/issue", post(issue_stock))
        .route("/inventory/adjust", post(adjust_stock))
        .route("/inventory/transfer", post(transfer_stock))
}

fn inventory_filter(query: &InventoryQuery, threshold: i32) -> InventoryFilter {
    InventoryFilter {
        product_id: query.product_id,
        warehouse_id: query.warehouse_id,
        max_quantity: query.low_stock.unwrap_or(false).then_some(threshold),
    }
}

async fn list_inventory(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<Paginated<InventoryItem>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    let filter = inventory_filter(&query, state.low_stock_threshold);

    let total = inventory_repo::count(&state.pool, &filter).await?;
    let items =
        inventory_repo::list(&state.pool, &filter, Some(page.limit), page.offset()).await?;

    Ok(Json(page.wrap(items, total)))
}

async fn list_transactions(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Paginated<InventoryTransaction>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<MovementKind>)
        .transpose()
        .map_err(ApiError::Validation)?;

    let filter = TransactionFilter {
        product_id: query.product_id,
        warehouse_id: query.warehouse_id,
        kind: kind.map(MovementKind::as_str),
        reference: trimmed(query.reference.as_deref()),
    };

    let total = inventory_repo::count_transactions(&state.pool, &filter).await?;
    let transactions =
        inventory_repo::list_transactions(&state.pool, &filter, page.limit, page.offset())
            .await?;

    Ok(Json(page.wrap(transactions, total)))
}

/// Run a single receive/issue/adjust movement in its own transaction.
async fn single_movement(
    state: &ApiState,
    auth_user: &AuthUser,
    movement: Movement<'_>,
) -> Result<MovementOutcome, ApiError> {
    let mut tx = state.pool.begin().await?;

    validate_slot(
        &mut tx,
        movement.product_id,
        movement.warehouse_id,
        movement.location_id,
    )
    .await?;
    let outcome = apply_movement(&mut tx, &movement).await?;

    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        &format!("inventory.{}", movement.kind),
        "inventory",
        Some(outcome.inventory_id),
        &json!({
            "product_id": movement.product_id,
            "warehouse_id": movement.warehouse_id,
            "location_id": movement.location_id,
            "quantity": outcome.delta,
            "quantity_after": outcome.quantity_after,
        }),
    )
    .await?;

    tx.commit().await?;

    metrics::record_inventory_movement(outcome.kind, outcome.delta);

    Ok(outcome)
}

async fn receive_stock(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryCreate])
        .await?;
    payload.validate()?;

    let outcome = single_movement(
        &state,
        &auth_user,
        Movement {
            product_id: payload.product_id,
            warehouse_id: payload.warehouse_id,
            location_id: payload.location_id,
            kind: MovementKind::Receive,
            quantity: payload.quantity,
            reference: trimmed(payload.reference.as_deref()),
            note: trimmed(payload.note.as_deref()),
            actor: Some(auth_user.user_id),
        },
    )
    .await?;

    Ok(Json(outcome.into()))
}

async fn issue_stock(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryUpdate])
        .await?;
    payload.validate()?;

    let outcome = single_movement(
        &state,
        &auth_user,
        Movement {
            product_id: payload.product_id,
            warehouse_id: payload.warehouse_id,
            location_id: payload.location_id,
            kind: MovementKind::Issue,
            quantity: payload.quantity,
            reference: trimmed(payload.reference.as_deref()),
            note: trimmed(payload.note.as_deref()),
            actor: Some(auth_user.user_id),
        },
    )
    .await?;

    Ok(Json(outcome.into()))
}

async fn adjust_stock(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryAdjust])
        .await?;
    payload.validate()?;

    let outcome = single_movement(
        &state,
        &auth_user,
        Movement {
            product_id: payload.product_id,
            warehouse_id: payload.warehouse_id,
            location_id: payload.location_id,
            kind: MovementKind::Adjust,
            quantity: payload.quantity,
            reference: None,
            note: trimmed(payload.note.as_deref()),
            actor: Some(auth_user.user_id),
        },
    )
    .await?;

    Ok(Json(outcome.into()))
}

async fn transfer_stock(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<TransferStockRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryUpdate])
        .await?;
    payload.validate()?;

    if payload.is_same_slot() {
        return Err(ApiError::BadRequest(
            "Source and destination must differ".to_string(),
        ));
    }

    let reference = format!("TRF-{}", Uuid::new_v4().simple());
    let note = trimmed(payload.note.as_deref());

    let mut tx = state.pool.begin().await?;

    validate_slot(
        &mut tx,
        payload.product_id,
        payload.from_warehouse_id,
        payload.from_location_id,
    )
    .await?;
    validate_slot(
        &mut tx,
        payload.product_id,
        payload.to_warehouse_id,
        payload.to_location_id,
    )
    .await?;

    let source = apply_movement(
        &mut tx,
        &Movement {
            product_id: payload.product_id,
            warehouse_id: payload.from_warehouse_id,
            location_id: payload.from_location_id,
            kind: MovementKind::TransferOut,
            quantity: payload.quantity,
            reference: Some(&reference),
            note,
            actor: Some(auth_user.user_id),
        },
    )
    .await?;
    let destination = apply_movement(
        &mut tx,
        &Movement {
            product_id: payload.product_id,
            warehouse_id: payload.to_warehouse_id,
            location_id: payload.to_location_id,
            kind: MovementKind::TransferIn,
            quantity: payload.quantity,
            reference: Some(&reference),
            note,
            actor: Some(auth_user.user_id),
        },
    )
    .await?;

    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "inventory.transfer",
        "inventory",
        Some(source.inventory_id),
        &json!({
            "reference": reference,
            "product_id": payload.product_id,
            "from_warehouse_id": payload.from_warehouse_id,
            "to_warehouse_id": payload.to_warehouse_id,
            "quantity": payload.quantity,
        }),
    )
    .await?;

    tx.commit().await?;

    metrics::record_inventory_movement(source.kind, source.delta);
    metrics::record_inventory_movement(destination.kind, destination.delta);

    Ok(Json(TransferResponse {
        reference,
        source: source.into(),
        destination: destination.into(),
    }))
}

async fn export_inventory(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Response, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InventoryRead])
        .await?;

    let filter = inventory_filter(&query, state.low_stock_threshold);
    let items = inventory_repo::list(&state.pool, &filter, None, 0).await?;

    let mut csv = CsvWriter::new(&[
        "sku",
        "product",
        "warehouse",
        "location",
        "quantity",
        "updated_at",
    ]);
    for item in &items {
        csv.push_row([
            item.product_sku.clone(),
            item.product_name.clone(),
            item.warehouse_code.clone(),
            item.location_code.clone().unwrap_or_default(),
            item.quantity.to_string(),
            format_timestamp(item.updated_at),
        ]);
    }

    Ok(csv_response("inventory.csv", csv.finish()))
}
