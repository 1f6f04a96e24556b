use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use wms_core::{PaymentStatus, csv::CsvWriter, money::format_money};
use wms_db::{
    models::{Invoice, InvoicePayment},
    repositories::{
        customer as customer_repo,
        invoice::{self as invoice_repo, InvoiceFilter},
    },
};

use super::{
    model::{
        CreateInvoiceRequest, InvoiceDetail, InvoiceQuery, PaymentRequest, day_end_exclusive,
        day_start,
    },
    print::render_invoice,
    service,
};
use crate::{
    ApiState,
    auth::{AuthUser, Permission},
    error::ApiError,
    export::{csv_response, format_timestamp},
    pagination::{Page, Paginated},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/export", get(export_invoices))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}/payments", post(add_payment))
        .route("/invoices/{id}/cancel", post(cancel_invoice))
        .route("/invoices/{id}/print", get(print_invoice))
}

/// Owned filter values parsed from the query string.
struct ParsedFilter {
    status: Option<PaymentStatus>,
    customer_id: Option<Uuid>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl ParsedFilter {
    fn from_query(query: &InvoiceQuery) -> Result<Self, ApiError> {
        let status = query
            .status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()
            .map_err(ApiError::Validation)?;

        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(ApiError::Validation(
                "from must not be after to".to_string(),
            ));
        }

        Ok(Self {
            status,
            customer_id: query.customer_id,
            from: query.from.map(day_start),
            to: query.to.and_then(day_end_exclusive),
        })
    }

    fn as_filter(&self) -> InvoiceFilter<'static> {
        InvoiceFilter {
            status: self.status.map(PaymentStatus::as_str),
            customer_id: self.customer_id,
            from: self.from,
            to: self.to,
        }
    }
}

async fn load_detail(pool: &PgPool, invoice_id: Uuid) -> Result<InvoiceDetail, ApiError> {
    let invoice = invoice_repo::find_by_id(pool, invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice"))?;
    let items = invoice_repo::items(pool, invoice_id).await?;
    let payments = invoice_repo::payments(pool, invoice_id).await?;

    Ok(InvoiceDetail {
        invoice,
        items,
        payments,
    })
}

async fn list_invoices(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<Paginated<Invoice>>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesRead])
        .await?;

    let page = Page::new(query.page, query.limit)?;
    let parsed = ParsedFilter::from_query(&query)?;
    let filter = parsed.as_filter();

    let total = invoice_repo::count(&state.pool, &filter).await?;
    let invoices =
        invoice_repo::list(&state.pool, &filter, Some(page.limit), page.offset()).await?;

    Ok(Json(page.wrap(invoices, total)))
}

async fn get_invoice(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesRead])
        .await?;

    Ok(Json(load_detail(&state.pool, invoice_id).await?))
}

async fn create_invoice(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceDetail>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesCreate])
        .await?;
    payload.validate()?;

    let created = service::create_invoice(&state.pool, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(load_detail(&state.pool, created.id).await?),
    ))
}

async fn add_payment(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<InvoicePayment>), ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesPay])
        .await?;
    payload.validate()?;

    let payment = service::add_payment(&state.pool, auth_user.user_id, invoice_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

async fn cancel_invoice(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesCancel])
        .await?;

    service::cancel_invoice(&state.pool, auth_user.user_id, invoice_id).await?;

    Ok(Json(load_detail(&state.pool, invoice_id).await?))
}

async fn print_invoice(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesRead])
        .await?;

    let detail = load_detail(&state.pool, invoice_id).await?;
    let customer = customer_repo::find_by_id(&state.pool, detail.invoice.customer_id).await?;

    Ok(Html(render_invoice(&detail, customer.as_ref())?))
}

async fn export_invoices(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Response, ApiError> {
    auth_user
        .require(&state.pool, &[Permission::InvoicesRead])
        .await?;

    let parsed = ParsedFilter::from_query(&query)?;
    let invoices = invoice_repo::list(&state.pool, &parsed.as_filter(), None, 0).await?;

    let mut csv = CsvWriter::new(&[
        "code",
        "customer_code",
        "customer",
        "warehouse",
        "status",
        "subtotal",
        "discount",
        "tax",
        "total",
        "paid_amount",
        "created_at",
    ]);
    for invoice in &invoices {
        csv.push_row([
            invoice.code.clone(),
            invoice.customer_code.clone(),
            invoice.customer_name.clone(),
            invoice.warehouse_name.clone(),
            invoice.status.clone(),
            format_money(invoice.subtotal),
            format_money(invoice.discount),
            format_money(invoice.tax),
            format_money(invoice.total),
            format_money(invoice.paid_amount),
            format_timestamp(invoice.created_at),
        ]);
    }

    Ok(csv_response("invoices.csv", csv.finish()))
}
