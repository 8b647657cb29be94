use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        AddSubTaskRequest, CreateJobRequest, DeleteJobQuery, JobBoardResponse, JobResponse,
        SubTaskResponse, UpdateCustomerRequest, UpdateJobStatusRequest,
    },
    models::{CreateJob, SubTask, SubTaskKind},
    utils::validation::ValidatedJson,
    AppState,
};

pub async fn create_job(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    tracing::info!(vehicle_no = %payload.vehicle_no, "Creating job");

    let job = state
        .repository
        .create_job(CreateJob {
            vehicle_no: payload.vehicle_no,
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            damage_remarks: payload.damage_remarks,
            photos: payload.photos,
            is_company_vehicle: payload.is_company_vehicle,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

/// The kanban board: all active jobs grouped by status.
pub async fn get_board(
    State(state): State<AppState>,
) -> Result<Json<JobBoardResponse>, AppError> {
    let board = state.repository.get_jobs_board().await?;
    Ok(Json(JobBoardResponse::from(board)))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = state
        .repository
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job {} not found", job_id)))?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<StatusCode, AppError> {
    tracing::info!(job_id = %job_id, new_status = payload.status.as_str(), "Updating job status");

    state
        .repository
        .update_job_status(job_id, payload.status, payload.changed_by.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<StatusCode, AppError> {
    state
        .repository
        .update_customer_details(
            job_id,
            payload.customer_name,
            payload.customer_phone,
            payload.damage_remarks,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_subtask(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<AddSubTaskRequest>,
) -> Result<(StatusCode, Json<SubTaskResponse>), AppError> {
    match payload.kind {
        SubTaskKind::Service if payload.service_name.as_deref().unwrap_or("").is_empty() => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "service subtasks require a service name"
            )));
        }
        SubTaskKind::Parts if payload.part_name.as_deref().unwrap_or("").is_empty() => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "parts subtasks require a part name"
            )));
        }
        _ => {}
    }

    let subtask = SubTask {
        id: Uuid::new_v4(),
        kind: payload.kind,
        service_name: payload.service_name,
        part_name: payload.part_name,
        brand: payload.brand,
        is_completed: payload.is_completed,
        approved_by: None,
        approved_at: None,
    };
    state.repository.add_subtask(job_id, &subtask).await?;

    Ok((StatusCode::CREATED, Json(SubTaskResponse::from(subtask))))
}

pub async fn remove_subtask(
    State(state): State<AppState>,
    Path((job_id, subtask_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.repository.remove_subtask(job_id, subtask_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft delete by default; `?hard=true` removes the document entirely.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<DeleteJobQuery>,
) -> Result<StatusCode, AppError> {
    if query.hard {
        tracing::info!(job_id = %job_id, "Hard-deleting job");
        state.repository.hard_delete_job(job_id).await?;
    } else {
        state.repository.soft_delete_job(job_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
