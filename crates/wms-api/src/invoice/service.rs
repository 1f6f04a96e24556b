//! Invoice lifecycle: creation with stock deduction, payments and
//! cancellation. Each operation runs in a single database transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use wms_core::{
    InvoiceError, MovementKind, PaymentStatus,
    invoice::{apply_payment, compute_totals, invoice_code_prefix, line_total, next_invoice_code},
};
use wms_db::{
    models::InvoicePayment,
    repositories::{
        activity_log, customer as customer_repo, invoice as invoice_repo, product as product_repo,
    },
};

use super::model::{CreateInvoiceRequest, PaymentRequest};
use crate::{
    error::ApiError,
    inventory::service::{Movement, MovementOutcome, apply_movement, validate_slot},
    metrics,
    validation::trimmed,
};

#[derive(Debug, Clone)]
pub struct CreatedInvoice {
    pub id: Uuid,
    pub code: String,
    pub status: PaymentStatus,
}

/// Create an invoice, deduct its stock and record the optional first payment.
pub async fn create_invoice(
    pool: &PgPool,
    actor: Uuid,
    request: &CreateInvoiceRequest,
) -> Result<CreatedInvoice, ApiError> {
    if request.items.is_empty() {
        return Err(InvoiceError::Empty.into());
    }

    let mut tx = pool.begin().await?;

    invoice_repo::lock_code_sequence(&mut *tx).await?;
    let today = Utc::now().date_naive();
    let latest = invoice_repo::latest_code_with_prefix(&mut *tx, &invoice_code_prefix(today)).await?;
    let code = next_invoice_code(today, latest.as_deref());

    if !customer_repo::exists(&mut *tx, request.customer_id).await? {
        return Err(ApiError::BadRequest("Customer does not exist".to_string()));
    }

    let mut lines = Vec::with_capacity(request.items.len());
    for item in &request.items {
        validate_slot(&mut tx, item.product_id, request.warehouse_id, item.location_id).await?;

        let list_price = product_repo::find_active_price(&mut *tx, item.product_id)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest(format!("Product {} is not active", item.product_id))
            })?;
        lines.push((item.quantity, item.unit_price.unwrap_or(list_price)));
    }

    let totals = compute_totals(
        &lines,
        request.discount.unwrap_or(Decimal::ZERO),
        request.tax.unwrap_or(Decimal::ZERO),
    )?;

    let mut movements: Vec<MovementOutcome> = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let outcome = apply_movement(
            &mut tx,
            &Movement {
                product_id: item.product_id,
                warehouse_id: request.warehouse_id,
                location_id: item.location_id,
                kind: MovementKind::Sale,
                quantity: item.quantity,
                reference: Some(&code),
                note: None,
                actor: Some(actor),
            },
        )
        .await?;
        movements.push(outcome);
    }

    let paid_amount = match &request.payment {
        Some(payment) => apply_payment(Decimal::ZERO, totals.total, payment.amount)?,
        None => Decimal::ZERO,
    };
    let status = PaymentStatus::from_amounts(paid_amount, totals.total);

    let invoice_id = invoice_repo::insert(
        &mut *tx,
        &code,
        request.customer_id,
        request.warehouse_id,
        status.as_str(),
        totals.subtotal,
        totals.discount,
        totals.tax,
        totals.total,
        paid_amount,
        trimmed(request.note.as_deref()),
        Some(actor),
    )
    .await?;

    for (position, (item, &(quantity, unit_price))) in
        request.items.iter().zip(&lines).enumerate()
    {
        invoice_repo::insert_item(
            &mut *tx,
            invoice_id,
            item.product_id,
            item.location_id,
            quantity,
            unit_price,
            line_total(quantity, unit_price),
            i32::try_from(position + 1).unwrap_or(i32::MAX),
        )
        .await?;
    }

    if let Some(payment) = &request.payment {
        invoice_repo::insert_payment(
            &mut *tx,
            invoice_id,
            payment.amount,
            payment.method.as_str(),
            trimmed(payment.note.as_deref()),
            Some(actor),
        )
        .await?;
    }

    activity_log::record(
        &mut *tx,
        Some(actor),
        "invoice.created",
        "invoice",
        Some(invoice_id),
        &json!({
            "code": code,
            "customer_id": request.customer_id,
            "total": totals.total,
            "paid_amount": paid_amount,
            "status": status,
        }),
    )
    .await?;

    tx.commit().await?;

    for outcome in &movements {
        metrics::record_inventory_movement(outcome.kind, outcome.delta);
    }
    metrics::record_invoice_created(status);
    tracing::info!(%invoice_id, %code, %status, total = %totals.total, "Invoice created");

    Ok(CreatedInvoice {
        id: invoice_id,
        code,
        status,
    })
}

/// Record a payment and recompute the invoice status.
pub async fn add_payment(
    pool: &PgPool,
    actor: Uuid,
    invoice_id: Uuid,
    payment: &PaymentRequest,
) -> Result<InvoicePayment, ApiError> {
    let mut tx = pool.begin().await?;

    let state = invoice_repo::lock_state(&mut *tx, invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice"))?;

    if state.status == PaymentStatus::Cancelled.as_str() {
        return Err(ApiError::BadRequest(
            "Cannot add a payment to a cancelled invoice".to_string(),
        ));
    }

    let paid_amount = apply_payment(state.paid_amount, state.total, payment.amount)?;
    let status = PaymentStatus::from_amounts(paid_amount, state.total);

    invoice_repo::update_payment_state(&mut *tx, invoice_id, paid_amount, status.as_str()).await?;
    let recorded = invoice_repo::insert_payment(
        &mut *tx,
        invoice_id,
        payment.amount,
        payment.method.as_str(),
        trimmed(payment.note.as_deref()),
        Some(actor),
    )
    .await?;

    activity_log::record(
        &mut *tx,
        Some(actor),
        "invoice.payment_added",
        "invoice",
        Some(invoice_id),
        &json!({
            "code": state.code,
            "amount": payment.amount,
            "method": payment.method,
            "paid_amount": paid_amount,
            "status": status,
        }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%invoice_id, amount = %payment.amount, %status, "Invoice payment recorded");

    Ok(recorded)
}

/// Cancel an unpaid invoice and put its stock back.
pub async fn cancel_invoice(pool: &PgPool, actor: Uuid, invoice_id: Uuid) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let state = invoice_repo::lock_state(&mut *tx, invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice"))?;

    if state.status == PaymentStatus::Cancelled.as_str() {
        return Err(ApiError::BadRequest(
            "Invoice is already cancelled".to_string(),
        ));
    }
    if invoice_repo::payment_count(&mut *tx, invoice_id).await? > 0 {
        return Err(ApiError::BadRequest(
            "Invoices with payments cannot be cancelled".to_string(),
        ));
    }

    let items = invoice_repo::items(&mut *tx, invoice_id).await?;
    let mut movements = Vec::with_capacity(items.len());
    for item in &items {
        let outcome = apply_movement(
            &mut tx,
            &Movement {
                product_id: item.product_id,
                warehouse_id: state.warehouse_id,
                location_id: item.location_id,
                kind: MovementKind::SaleCancel,
                quantity: item.quantity,
                reference: Some(&state.code),
                note: None,
                actor: Some(actor),
            },
        )
        .await?;
        movements.push(outcome);
    }

    invoice_repo::set_status(&mut *tx, invoice_id, PaymentStatus::Cancelled.as_str()).await?;

    activity_log::record(
        &mut *tx,
        Some(actor),
        "invoice.cancelled",
        "invoice",
        Some(invoice_id),
        &json!({ "code": state.code, "restored_items": items.len() }),
    )
    .await?;

    tx.commit().await?;

    for outcome in &movements {
        metrics::record_inventory_movement(outcome.kind, outcome.delta);
    }
    tracing::info!(%invoice_id, code = %state.code, "Invoice cancelled");

    Ok(())
}
