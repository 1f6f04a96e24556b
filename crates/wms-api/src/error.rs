use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use wms_core::{InvoiceError, StockError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Facebook Graph API error: {0}")]
    Graph(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) | Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Graph(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    Self::BadRequest(unique_violation_message(db_err.constraint()).to_string())
                }
                ErrorKind::ForeignKeyViolation => Self::BadRequest(
                    "Operation refers to a missing record or one that is still in use".to_string(),
                ),
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    Self::BadRequest(format!("Invalid data: {}", db_err.message()))
                }
                _ => Self::Database(err),
            },
            _ => Self::Database(err),
        }
    }
}

/// Client-facing message for a unique constraint violation.
fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "Email already in use",
        Some("users_username_key") => "Username already taken",
        Some("roles_name_key") => "Role name already exists",
        Some("customer_groups_code_key") => "Customer group code already exists",
        Some("customers_code_key") => "Customer code already exists",
        Some("products_sku_key") => "Product SKU already exists",
        Some("product_attributes_product_name_key") => "Duplicate attribute name",
        Some("warehouses_code_key") => "Warehouse code already exists",
        Some("warehouse_locations_warehouse_code_key") => {
            "Location code already exists in this warehouse"
        }
        Some("invoices_code_key") => "Invoice code already exists",
        _ => "Record already exists",
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: invalid value ({})", e.code),
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            Self::Validation("Invalid request".to_string())
        } else {
            Self::Validation(messages.join("; "))
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("password hashing failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal server error".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                "Internal server error".to_string()
            }
            Self::Jwt(e) => {
                tracing::debug!(error = %e, "JWT error");
                "Invalid or expired token".to_string()
            }
            Self::Graph(e) => {
                tracing::warn!(error = %e, "Facebook Graph API error");
                self.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
