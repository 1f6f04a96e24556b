//! Stock movements.
//!
//! Every change to an `inventory` row goes through [`apply_movement`], which
//! locks the row, checks the new quantity and writes the matching
//! `inventory_transactions` entry. Callers own the transaction so that several
//! movements (a transfer, the lines of an invoice) commit or roll back together.

use sqlx::PgConnection;
use uuid::Uuid;

use wms_core::stock::{MovementKind, adjustment_delta, apply_delta, signed_delta};
use wms_db::{
    models::NewInventoryTransaction,
    repositories::{inventory as inventory_repo, product as product_repo, warehouse as warehouse_repo},
};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct Movement<'a> {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub kind: MovementKind,
    /// Units moved, or the new absolute quantity for [`MovementKind::Adjust`]
    pub quantity: i32,
    pub reference: Option<&'a str>,
    pub note: Option<&'a str>,
    pub actor: Option<Uuid>,
}

#[derive(Debug, Clone, Copy)]
pub struct MovementOutcome {
    pub transaction_id: Uuid,
    pub inventory_id: Uuid,
    pub kind: MovementKind,
    pub delta: i32,
    pub quantity_after: i32,
}

/// Check that the product and warehouse exist and that the location, when
/// given, belongs to the warehouse.
pub async fn validate_slot(
    conn: &mut PgConnection,
    product_id: Uuid,
    warehouse_id: Uuid,
    location_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if !product_repo::exists(&mut *conn, product_id).await? {
        return Err(ApiError::BadRequest("Product does not exist".to_string()));
    }

    let warehouse = warehouse_repo::find_by_id(&mut *conn, warehouse_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Warehouse does not exist".to_string()))?;
    if !warehouse.is_active {
        return Err(ApiError::BadRequest(format!(
            "Warehouse {} is inactive",
            warehouse.code
        )));
    }

    if let Some(location_id) = location_id
        && !warehouse_repo::location_in_warehouse(&mut *conn, location_id, warehouse_id).await?
    {
        return Err(ApiError::BadRequest(
            "Location does not belong to the warehouse".to_string(),
        ));
    }

    Ok(())
}

/// Apply one movement inside the caller's transaction.
pub async fn apply_movement(
    conn: &mut PgConnection,
    movement: &Movement<'_>,
) -> Result<MovementOutcome, ApiError> {
    let slot = inventory_repo::lock_slot(
        &mut *conn,
        movement.product_id,
        movement.warehouse_id,
        movement.location_id,
    )
    .await?;

    let delta = match movement.kind {
        MovementKind::Adjust => adjustment_delta(slot.quantity, movement.quantity)?,
        kind => signed_delta(kind, movement.quantity)?,
    };
    let quantity_after = apply_delta(slot.quantity, delta)?;

    inventory_repo::set_quantity(&mut *conn, slot.id, quantity_after).await?;

    let transaction_id = inventory_repo::insert_transaction(
        &mut *conn,
        &NewInventoryTransaction {
            inventory_id: slot.id,
            product_id: movement.product_id,
            warehouse_id: movement.warehouse_id,
            location_id: movement.location_id,
            kind: movement.kind.as_str(),
            quantity: delta,
            quantity_after,
            reference: movement.reference,
            note: movement.note,
            created_by: movement.actor,
        },
    )
    .await?;

    tracing::debug!(
        product_id = %movement.product_id,
        warehouse_id = %movement.warehouse_id,
        kind = %movement.kind,
        delta,
        quantity_after,
        "Stock movement applied"
    );

    Ok(MovementOutcome {
        transaction_id,
        inventory_id: slot.id,
        kind: movement.kind,
        delta,
        quantity_after,
    })
}
