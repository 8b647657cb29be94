use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::fmt_datetime;
use crate::models::{Job, JobBoard, JobStatus, SubTask, SubTaskKind};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "vehicle number is required"))]
    pub vehicle_no: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub damage_remarks: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub is_company_vehicle: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
    pub changed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub damage_remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddSubTaskRequest {
    pub kind: SubTaskKind,
    pub service_name: Option<String>,
    pub part_name: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteJobQuery {
    #[serde(default)]
    pub hard: bool,
}

#[derive(Debug, Serialize)]
pub struct SubTaskResponse {
    pub id: Uuid,
    pub kind: SubTaskKind,
    pub service_name: Option<String>,
    pub part_name: Option<String>,
    pub brand: Option<String>,
    pub is_completed: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
}

impl From<SubTask> for SubTaskResponse {
    fn from(s: SubTask) -> Self {
        Self {
            id: s.id,
            kind: s.kind,
            service_name: s.service_name,
            part_name: s.part_name,
            brand: s.brand,
            is_completed: s.is_completed,
            approved_by: s.approved_by,
            approved_at: s.approved_at.map(fmt_datetime),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub vehicle_no: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub damage_remarks: Option<String>,
    pub photos: Vec<String>,
    pub subtasks: Vec<SubTaskResponse>,
    pub status: JobStatus,
    pub is_company_vehicle: bool,
    pub status_changed_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            vehicle_no: job.vehicle_no,
            customer_name: job.customer_name,
            customer_phone: job.customer_phone,
            damage_remarks: job.damage_remarks,
            photos: job.photos,
            subtasks: job.subtasks.into_iter().map(SubTaskResponse::from).collect(),
            status: job.status,
            is_company_vehicle: job.is_company_vehicle,
            status_changed_by: job.status_changed_by,
            created_at: fmt_datetime(job.created_at),
            updated_at: fmt_datetime(job.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobBoardResponse {
    pub todo: Vec<JobResponse>,
    pub in_progress: Vec<JobResponse>,
    pub finished: Vec<JobResponse>,
    pub delivered: Vec<JobResponse>,
}

impl From<JobBoard> for JobBoardResponse {
    fn from(board: JobBoard) -> Self {
        let convert = |jobs: Vec<Job>| jobs.into_iter().map(JobResponse::from).collect();
        Self {
            todo: convert(board.todo),
            in_progress: convert(board.in_progress),
            finished: convert(board.finished),
            delivered: convert(board.delivered),
        }
    }
}
