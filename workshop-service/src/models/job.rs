//! Job (work order) model.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position of a job in the workshop pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Todo,
    InProgress,
    Finished,
    Delivered,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Todo => "todo",
            JobStatus::InProgress => "in_progress",
            JobStatus::Finished => "finished",
            JobStatus::Delivered => "delivered",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "in_progress" => JobStatus::InProgress,
            "finished" => JobStatus::Finished,
            "delivered" => JobStatus::Delivered,
            _ => JobStatus::Todo,
        }
    }
}

/// Line-item kind on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTaskKind {
    Parts,
    Service,
}

/// A part or service line item owned by its parent job.
///
/// Appended and removed as a unit; array mutations on `subtasks` are not
/// version-guarded (unlike bill financial writes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub id: Uuid,
    pub kind: SubTaskKind,
    pub service_name: Option<String>,
    pub part_name: Option<String>,
    pub brand: Option<String>,
    pub is_completed: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime>,
}

impl SubTask {
    /// A completed, approved service line appended during bill creation.
    pub fn completed_service(name: &str, approved_by: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: SubTaskKind::Service,
            service_name: Some(name.to_string()),
            part_name: None,
            brand: None,
            is_completed: true,
            approved_by: approved_by.map(str::to_string),
            approved_at: Some(DateTime::now()),
        }
    }
}

/// A vehicle service work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub vehicle_no: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub damage_remarks: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    pub status: JobStatus,
    pub is_company_vehicle: bool,
    #[serde(default)]
    pub deleted: bool,
    pub status_changed_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Input for creating a job.
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub vehicle_no: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub damage_remarks: Option<String>,
    pub photos: Vec<String>,
    pub is_company_vehicle: bool,
}

/// All active jobs grouped by pipeline column.
#[derive(Debug, Clone, Default)]
pub struct JobBoard {
    pub todo: Vec<Job>,
    pub in_progress: Vec<Job>,
    pub finished: Vec<Job>,
    pub delivered: Vec<Job>,
}
