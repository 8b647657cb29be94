use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::fmt_datetime;
use crate::models::{ApprovalPayload, ApprovalRequest, ApprovalStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApprovalRequest {
    pub job_id: Uuid,
    #[validate(length(min = 1, message = "requester is required"))]
    pub requested_by: String,
    pub payload: ApprovalPayload,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecideApprovalRequest {
    #[validate(length(min = 1, message = "decider is required"))]
    pub decided_by: String,
    pub approve: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListApprovalsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub requested_by: String,
    pub request_type: String,
    pub payload: ApprovalPayload,
    pub status: ApprovalStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

impl From<ApprovalRequest> for ApprovalResponse {
    fn from(r: ApprovalRequest) -> Self {
        Self {
            id: r.id,
            job_id: r.job_id,
            requested_by: r.requested_by,
            request_type: r.payload.type_name().to_string(),
            payload: r.payload,
            status: r.status,
            decided_by: r.decided_by,
            decided_at: r.decided_at.map(fmt_datetime),
            rejection_reason: r.rejection_reason,
            created_at: fmt_datetime(r.created_at),
        }
    }
}
