//! HTTP handlers for payments

use crate::core::LedgerResult;
use crate::entities::{CreatePaymentRequest, NewPayment, Payment, PaymentPatch, PaymentView};
use crate::server::extractors::{Caller, JsonBody, RecordId, ValidatedJson};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

pub async fn create_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ValidatedJson(body): ValidatedJson<CreatePaymentRequest>,
) -> LedgerResult<(StatusCode, Json<Payment>)> {
    let new = NewPayment::try_from(body)?;
    let payment = state.payments.create(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> LedgerResult<Json<Vec<PaymentView>>> {
    Ok(Json(state.payments.list(&caller).await?))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
) -> LedgerResult<Json<PaymentView>> {
    Ok(Json(state.payments.get(&caller, id).await?))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<PaymentPatch>,
) -> LedgerResult<Json<Payment>> {
    Ok(Json(state.payments.update(&caller, id, patch).await?))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
) -> LedgerResult<Json<Value>> {
    state.payments.delete(&caller, id).await?;
    Ok(Json(json!({ "message": "Payment removed", "id": id })))
}

pub async fn mark_payment_paid(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
) -> LedgerResult<Json<Value>> {
    let payment = state.payments.mark_paid(&caller, id).await?;
    Ok(Json(json!({
        "message": "Payment marked as paid",
        "payment": payment
    })))
}
