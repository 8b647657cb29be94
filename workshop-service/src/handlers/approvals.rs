use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{ApprovalResponse, CreateApprovalRequest, DecideApprovalRequest, ListApprovalsQuery},
    models::ApprovalStatus,
    utils::validation::ValidatedJson,
    AppState,
};

pub async fn create_request(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateApprovalRequest>,
) -> Result<(StatusCode, Json<ApprovalResponse>), AppError> {
    let metadata = payload
        .metadata
        .map(|value| {
            bson::to_document(&value).map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("metadata must be an object: {}", e))
            })
        })
        .transpose()?;

    tracing::info!(
        job_id = %payload.job_id,
        request_type = payload.payload.type_name(),
        requested_by = %payload.requested_by,
        "Submitting approval request"
    );

    let request = state
        .approvals
        .submit(payload.job_id, payload.requested_by, payload.payload, metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(ApprovalResponse::from(request))))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListApprovalsQuery>,
) -> Result<Json<Vec<ApprovalResponse>>, AppError> {
    let status = query.status.as_deref().map(ApprovalStatus::from_string);
    let requests = state.approvals.list_requests(status).await?;
    Ok(Json(
        requests.into_iter().map(ApprovalResponse::from).collect(),
    ))
}

/// Approve or reject a pending request. Approval replays the captured
/// mutation; a request that already left `pending` cannot be re-decided.
pub async fn decide_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DecideApprovalRequest>,
) -> Result<Json<ApprovalResponse>, AppError> {
    tracing::info!(
        request_id = %request_id,
        approve = payload.approve,
        decided_by = %payload.decided_by,
        "Deciding approval request"
    );

    let request = state
        .approvals
        .decide(request_id, payload.decided_by, payload.approve, payload.reason)
        .await?;
    Ok(Json(ApprovalResponse::from(request)))
}
