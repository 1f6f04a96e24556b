use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use wms_core::money;

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// User as exposed by the API (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Primary role
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to verify a login
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    /// `<resource>.<action>`
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomerGroup {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Number of customers currently assigned to the group
    pub customer_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_code: Option<String>,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on customer insert/update
#[derive(Debug, Clone, Default)]
pub struct CustomerFields {
    pub code: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_code: Option<String>,
    pub group_id: Option<Uuid>,
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub description: Option<String>,
    #[serde(serialize_with = "money::serialize")]
    pub price: Decimal,
    #[serde(serialize_with = "money::serialize_option")]
    pub cost_price: Option<Decimal>,
    pub is_active: bool,
    /// Quantity on hand across all warehouses
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on product insert/update
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductAttribute {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Warehouses and stock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WarehouseLocation {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stock row joined with the names of what it refers to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_sku: String,
    pub product_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_code: String,
    pub warehouse_name: String,
    pub location_id: Option<Uuid>,
    pub location_code: Option<String>,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Stock row locked for update inside a transaction
#[derive(Debug, Clone, Copy, FromRow)]
pub struct StockSlot {
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryTransaction {
    pub id: Uuid,
    /// `None` once the stock slot was removed with its location
    pub inventory_id: Option<Uuid>,
    pub product_id: Uuid,
    pub product_sku: String,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub kind: String,
    /// Signed change applied to the stock row
    pub quantity: i32,
    pub quantity_after: i32,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// New inventory transaction row
#[derive(Debug, Clone)]
pub struct NewInventoryTransaction<'a> {
    pub inventory_id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub kind: &'a str,
    pub quantity: i32,
    pub quantity_after: i32,
    pub reference: Option<&'a str>,
    pub note: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub customer_code: String,
    pub customer_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub status: String,
    #[serde(serialize_with = "money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub tax: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub total: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub paid_amount: Decimal,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal invoice state used when mutating an invoice
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceState {
    pub id: Uuid,
    pub code: String,
    pub warehouse_id: Uuid,
    pub status: String,
    pub total: Decimal,
    pub paid_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub product_sku: String,
    pub product_name: String,
    pub unit: String,
    pub location_id: Option<Uuid>,
    pub quantity: i32,
    #[serde(serialize_with = "money::serialize")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoicePayment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[serde(serialize_with = "money::serialize")]
    pub amount: Decimal,
    pub method: String,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Facebook integration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacebookPage {
    pub id: Uuid,
    /// Page id on Facebook
    pub page_id: String,
    pub name: String,
    pub category: Option<String>,
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacebookUser {
    pub id: Uuid,
    pub fb_user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacebookMessage {
    pub id: Uuid,
    pub message_id: String,
    pub page_id: Uuid,
    pub conversation_id: String,
    pub sender_fb_id: Option<String>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacebookComment {
    pub id: Uuid,
    pub comment_id: String,
    pub page_id: Uuid,
    pub post_id: String,
    pub parent_comment_id: Option<String>,
    pub from_fb_id: Option<String>,
    pub from_name: Option<String>,
    pub message: Option<String>,
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacebookActivityLog {
    pub id: Uuid,
    pub page_id: Option<Uuid>,
    pub action: String,
    pub status: String,
    pub message: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
