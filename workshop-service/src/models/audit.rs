//! Audit log entry, appended fire-and-forget after financial operations.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub action: String,
    pub actor: Option<String>,
    pub job_id: Option<Uuid>,
    pub bill_id: Option<Uuid>,
    pub detail: String,
    pub created_at: DateTime,
}

impl AuditLogEntry {
    pub fn new(
        action: &str,
        actor: Option<String>,
        job_id: Option<Uuid>,
        bill_id: Option<Uuid>,
        detail: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.to_string(),
            actor,
            job_id,
            bill_id,
            detail,
            created_at: DateTime::now(),
        }
    }
}
