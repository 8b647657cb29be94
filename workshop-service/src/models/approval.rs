//! Approval request model: a deferred, privilege-gated mutation.

use bson::{DateTime, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{JobStatus, PaymentMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Pending,
        }
    }
}

/// The captured mutation, one variant per request type. Executed via an
/// exhaustive match when the request is approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalPayload {
    Part {
        part_name: String,
        brand: Option<String>,
    },
    Service {
        service_name: String,
    },
    StatusChange {
        new_status: JobStatus,
    },
    #[serde(alias = "payment")]
    CreditPayment {
        bill_id: Uuid,
        amount: f64,
        method: PaymentMethod,
        cheque_no: Option<String>,
    },
}

impl ApprovalPayload {
    pub fn type_name(&self) -> &'static str {
        match self {
            ApprovalPayload::Part { .. } => "part",
            ApprovalPayload::Service { .. } => "service",
            ApprovalPayload::StatusChange { .. } => "status_change",
            ApprovalPayload::CreditPayment { .. } => "credit_payment",
        }
    }
}

/// A staff-initiated mutation awaiting a decision. Leaves `pending`
/// exactly once, to `approved` or `rejected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub job_id: Uuid,
    pub requested_by: String,
    pub payload: ApprovalPayload,
    pub status: ApprovalStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime>,
    pub rejection_reason: Option<String>,
    pub metadata: Option<Document>,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_with_type_tag() {
        let payload = ApprovalPayload::Part {
            part_name: "Brake pad".to_string(),
            brand: Some("Bosch".to_string()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "part");
        let back: ApprovalPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.type_name(), "part");
    }

    #[test]
    fn legacy_payment_tag_maps_to_credit_payment() {
        let value = serde_json::json!({
            "type": "payment",
            "bill_id": Uuid::new_v4(),
            "amount": 150.0,
            "method": "upi",
            "cheque_no": null,
        });
        let payload: ApprovalPayload = serde_json::from_value(value).unwrap();
        assert_eq!(payload.type_name(), "credit_payment");
    }
}
