use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{PaymentResponse, RecordPaymentRequest, RecordPaymentResponse},
    services::RecordPayment,
    AppState,
};

pub async fn record_payment(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), AppError> {
    let paid_at = match payload.paid_at.as_deref() {
        Some(raw) => {
            let parsed = chrono::DateTime::parse_from_rfc3339(raw).map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("invalid paid_at timestamp: {}", e))
            })?;
            Some(bson::DateTime::from_millis(parsed.timestamp_millis()))
        }
        None => None,
    };

    tracing::info!(
        bill_id = %bill_id,
        amount = payload.amount,
        method = payload.method.as_str(),
        "Recording credit payment"
    );

    let outcome = state
        .billing
        .record_payment(RecordPayment {
            bill_id,
            amount: payload.amount,
            method: payload.method,
            cheque_no: payload.cheque_no,
            paid_at,
            processed_by: payload.processed_by,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse::from(outcome)),
    ))
}

/// Date-ordered payment history for a bill.
pub async fn payment_history(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.billing.get_payment_history(bill_id).await?;
    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}
