use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{BillResponse, CreateBillRequest, CreateBillResponse, SnapshotResponse},
    AppState,
};

/// Create and finalize a bill for a job in one step. Idempotent per job:
/// a duplicate submit returns the existing bill with `is_existing: true`.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(payload): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<CreateBillResponse>), AppError> {
    let (input, additional_services) = payload.into_parts();
    tracing::info!(
        job_id = %input.job_id,
        total_amount = input.total_amount,
        payment_type = input.payment_type.as_str(),
        "Creating bill"
    );

    let creation = state
        .billing
        .create_bill(input, additional_services, true)
        .await?;
    let status = if creation.is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(CreateBillResponse::from(creation))))
}

/// Create a draft bill, editable until finalized.
pub async fn create_draft_bill(
    State(state): State<AppState>,
    Json(payload): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<CreateBillResponse>), AppError> {
    let (input, additional_services) = payload.into_parts();
    tracing::info!(job_id = %input.job_id, "Creating draft bill");

    let creation = state
        .billing
        .create_bill(input, additional_services, false)
        .await?;
    let status = if creation.is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(CreateBillResponse::from(creation))))
}

pub async fn finalize_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<BillResponse>, AppError> {
    tracing::info!(bill_id = %bill_id, "Finalizing draft bill");

    let bill = state.billing.finalize_bill(bill_id).await?;
    Ok(Json(BillResponse::from(bill)))
}

/// Fetch a bill by its own id, falling back to "most recent bill for
/// this job id" when the path id is a job id.
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state
        .billing
        .get_bill(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Bill {} not found", id)))?;
    Ok(Json(BillResponse::from(bill)))
}

pub async fn get_snapshots(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<Vec<SnapshotResponse>>, AppError> {
    let snapshots = state.billing.get_snapshots(bill_id).await?;
    Ok(Json(
        snapshots.into_iter().map(SnapshotResponse::from).collect(),
    ))
}
