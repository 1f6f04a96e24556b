use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{
    activity_log, auth, customer, customer_group, facebook, inventory, invoice, product, role,
    state::ApiState, user, warehouse,
};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(role::routes())
        .merge(user::routes())
        .merge(customer_group::routes())
        .merge(customer::routes())
        .merge(product::routes())
        .merge(warehouse::routes())
        .merge(inventory::routes())
        .merge(invoice::routes())
        .merge(activity_log::routes())
        .merge(facebook::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource was not found" })),
    )
}
