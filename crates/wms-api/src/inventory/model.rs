use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use wms_core::MovementKind;

use super::service::MovementOutcome;

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub kind: Option<String>,
    pub reference: Option<String>,
}

/// Body of `receive` and `issue`.
#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: i32,
    #[validate(length(max = 100, message = "Reference too long"))]
    pub reference: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    /// New quantity on hand
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TransferStockRequest {
    pub product_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub from_location_id: Option<Uuid>,
    pub to_warehouse_id: Uuid,
    pub to_location_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: i32,
    pub note: Option<String>,
}

impl TransferStockRequest {
    pub fn is_same_slot(&self) -> bool {
        self.from_warehouse_id == self.to_warehouse_id && self.from_location_id == self.to_location_id
    }
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub transaction_id: Uuid,
    pub inventory_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    pub quantity_after: i32,
}

impl From<MovementOutcome> for MovementResponse {
    fn from(outcome: MovementOutcome) -> Self {
        Self {
            transaction_id: outcome.transaction_id,
            inventory_id: outcome.inventory_id,
            kind: outcome.kind,
            quantity: outcome.delta,
            quantity_after: outcome.quantity_after,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub reference: String,
    pub source: MovementResponse,
    pub destination: MovementResponse,
}
