use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, put},
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use wms_core::{csv::CsvWriter, money::format_money};
use wms_db::{
    models::{Product, ProductAttribute},
    repositories::{
        activity_log,
        product::{self as product_repo, ProductFilter},
    },
};

use super::model::{
    AttributeInput, CreateProductRequest, ProductDetail, ProductQuery, UpdateProductRequest,
    attribute_columns, product_search_text,
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
        .route("/products", get(list_products).post(create_product))
        .route("/products/export", get(export_products))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/{id}/attributes", put(set_attributes))
}

async fn load_detail(pool: &PgPool, product_id: Uuid) -> Result<ProductDetail, ApiError> {
    let product = product_repo::find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;
    let attributes = product_repo::attributes(pool, product_id).await?;

    Ok(ProductDetail {
        product,
        attributes,
    })
}

async fn list_products(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Paginated<Product>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    let search = search_term(query.search.as_deref());
    let filter = ProductFilter {
        search: search.as_deref(),
        is_active: query.active,
    };

    let total = product_repo::count(&state.pool, &filter).await?;
    let products =
        product_repo::list(&state.pool, &filter, Some(page.limit), page.offset()).await?;

    Ok(Json(page.wrap(products, total)))
}

async fn get_product(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductDetail>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsRead])
        .await?;

    Ok(Json(load_detail(&state.pool, product_id).await?))
}

async fn create_product(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDetail>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsCreate])
        .await?;
    payload.validate()?;

    let fields = payload.fields();
    let (names, values) = attribute_columns(&payload.attributes)?;

    let mut tx = state.pool.begin().await?;

    let product_id =
        product_repo::create(&mut *tx, &fields, &product_search_text(&fields)).await?;
    if !names.is_empty() {
        product_repo::insert_attributes(&mut *tx, product_id, &names, &values).await?;
    }
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "product.created",
        "product",
        Some(product_id),
        &json!({ "sku": fields.sku, "price": fields.price }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%product_id, sku = %fields.sku, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(load_detail(&state.pool, product_id).await?),
    ))
}

async fn update_product(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductDetail>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsUpdate])
        .await?;
    payload.validate()?;
    require_changes(payload.has_changes())?;

    let current = product_repo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;
    let fields = payload.merge_into(current);

    let updated = product_repo::update(
        &state.pool,
        product_id,
        &fields,
        &product_search_text(&fields),
    )
    .await?;
    if !updated {
        return Err(ApiError::not_found("Product"));
    }

    Ok(Json(load_detail(&state.pool, product_id).await?))
}

async fn delete_product(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsDelete])
        .await?;

    let product = product_repo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    if product.stock_quantity > 0 {
        return Err(ApiError::BadRequest(format!(
            "Product still has {} unit(s) in stock",
            product.stock_quantity
        )));
    }
    if product_repo::is_invoiced(&state.pool, product_id).await? {
        return Err(ApiError::BadRequest(
            "Product is referenced by invoices and cannot be deleted".to_string(),
        ));
    }
    if product_repo::has_movements(&state.pool, product_id).await? {
        return Err(ApiError::BadRequest(
            "Product has stock history and cannot be deleted; deactivate it instead".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    product_repo::delete(&mut *tx, product_id).await?;
    activity_log::record(
        &mut *tx,
        Some(auth_user.user_id),
        "product.deleted",
        "product",
        Some(product_id),
        &json!({ "sku": product.sku }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Product deleted successfully",
        "id": product_id
    })))
}

async fn set_attributes(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<Vec<AttributeInput>>,
) -> Result<Json<Vec<ProductAttribute>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsUpdate])
        .await?;
    for attribute in &payload {
        attribute.validate()?;
    }

    let (names, values) = attribute_columns(&payload)?;

    if !product_repo::exists(&state.pool, product_id).await? {
        return Err(ApiError::not_found("Product"));
    }

    let mut tx = state.pool.begin().await?;

    product_repo::clear_attributes(&mut *tx, product_id).await?;
    if !names.is_empty() {
        product_repo::insert_attributes(&mut *tx, product_id, &names, &values).await?;
    }

    tx.commit().await?;

    Ok(Json(product_repo::attributes(&state.pool, product_id).await?))
}

async fn export_products(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::ProductsRead])
        .await?;

    let search = search_term(query.search.as_deref());
    let filter = ProductFilter {
        search: search.as_deref(),
        is_active: query.active,
    };
    let products = product_repo::list(&state.pool, &filter, None, 0).await?;

    let mut csv = CsvWriter::new(&[
        "sku",
        "name",
        "unit",
        "price",
        "cost_price",
        "stock",
        "active",
        "created_at",
    ]);
    for product in &products {
        csv.push_row([
            product.sku.clone(),
            product.name.clone(),
            product.unit.clone(),
            format_money(product.price),
            product.cost_price.map(format_money).unwrap_or_default(),
            product.stock_quantity.to_string(),
            product.is_active.to_string(),
            format_timestamp(product.created_at),
        ]);
    }

    Ok(csv_response("products.csv", csv.finish()))
}
