use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use wms_core::csv::CsvWriter;
use wms_db::{
    models::Customer,
    repositories::{
        activity_log,
        customer::{self as customer_repo, CustomerFilter},
        customer_group as group_repo,
    },
};

use super::model::{
    CreateCustomerRequest, CustomerQuery, UpdateCustomerRequest, customer_search_text,
};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    export::{csv_response, format_timestamp},
    normalization::search_term,
    pagination::{Page, Paginated},
    validation::require_changes,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/export", get(export_customers))
        .route(
            "/customers/{id}",
            get(get_customer).patch(update_customer).delete(delete_customer),
        )
}

async fn ensure_group_exists(pool: &PgPool, group_id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(group_id) = group_id
        && !group_repo::exists(pool, group_id).await?
    {
        return Err(ApiError::BadRequest(
            "Customer group does not exist".to_string(),
        ));
    }
    Ok(())
}

async fn fetch_customer(pool: &PgPool, customer_id: Uuid) -> Result<Customer, ApiError> {
    customer_repo::find_by_id(pool, customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))
}

async fn list_customers(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Paginated<Customer>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    let search = search_term(query.search.as_deref());
    let filter = CustomerFilter {
        search: search.as_deref(),
        group_id: query.group_id,
    };

    let total = customer_repo::count(&state.pool, &filter).await?;
    let customers =
        customer_repo::list(&state.pool, &filter, Some(page.limit), page.offset()).await?;

    Ok(Json(page.wrap(customers, total)))
}

async fn get_customer(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersRead])
        .await?;

    Ok(Json(fetch_customer(&state.pool, customer_id).await?))
}

async fn create_customer(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersCreate])
        .await?;
    payload.validate()?;
    ensure_group_exists(&state.pool, payload.group_id).await?;

    let fields = payload.into_fields();
    let search_text = customer_search_text(&fields);

    let mut tx = state.pool.begin().await?;

    let customer_id = customer_repo::create(&mut *tx, &fields, &search_text).await?;
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "customer.created",
        "customer",
        Some(customer_id),
        &json!({ "code": fields.code, "name": fields.name }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%customer_id, code = %fields.code, "Customer created");

    Ok((
        StatusCode::CREATED,
        Json(fetch_customer(&state.pool, customer_id).await?),
    ))
}

async fn update_customer(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersUpdate])
        .await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;
    ensure_group_exists(&state.pool, payload.group_id).await?;

    let current = fetch_customer(&state.pool, customer_id).await?;
    let fields = payload.merge_into(current);
    let search_text = customer_search_text(&fields);

    if !customer_repo::update(&state.pool, customer_id, &fields, &search_text).await? {
        return Err(ApiError::not_found("Customer"));
    }

    Ok(Json(fetch_customer(&state.pool, customer_id).await?))
}

async fn delete_customer(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersDelete])
        .await?;

    let customer = fetch_customer(&state.pool, customer_id).await?;
    if customer_repo::has_invoices(&state.pool, customer_id).await? {
        return Err(ApiError::BadRequest(
            "Customer has invoices and cannot be deleted".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    customer_repo::delete(&mut *tx, customer_id).await?;
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "customer.deleted",
        "customer",
        Some(customer_id),
        &json!({ "code": customer.code }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Customer deleted successfully",
        "id": customer_id
    })))
}

async fn export_customers(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<CustomerQuery>,
) -> Result<Response, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::CustomersRead])
        .await?;

    let search = search_term(query.search.as_deref());
    let filter = CustomerFilter {
        search: search.as_deref(),
        group_id: query.group_id,
    };
    let customers = customer_repo::list(&state.pool, &filter, None, 0).await?;

    let mut csv = CsvWriter::new(&[
        "code",
        "name",
        "phone",
        "email",
        "address",
        "group",
        "created_at",
    ]);
    for customer in &customers {
        csv.push_row([
            customer.code.as_str(),
            customer.name.as_str(),
            customer.phone.as_deref().unwrap_or_default(),
            customer.email.as_deref().unwrap_or_default(),
            customer.address.as_deref().unwrap_or_default(),
            customer.group_name.as_deref().unwrap_or_default(),
            format_timestamp(customer.created_at).as_str(),
        ]);
    }

    Ok(csv_response("customers.csv", csv.finish()))
}
