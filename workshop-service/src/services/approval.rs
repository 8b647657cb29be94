//! Approval workflow: staff-initiated mutations captured as pending
//! requests, replayed on approval.
//!
//! Decision and execution run in one transaction, so a request can never
//! end up `approved` with its mutation unapplied.

use bson::{doc, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::ClientSession;
use uuid::Uuid;

use crate::models::{
    ApprovalPayload, ApprovalRequest, ApprovalStatus, AuditLogEntry, BillStatus, CreditPayment,
    PaymentType, StatusHistoryEntry, SubTask, SubTaskKind,
};
use crate::services::error::ServiceError;
use crate::services::repository::WorkshopRepository;
use crate::services::{metrics, money};

#[derive(Clone)]
pub struct ApprovalService {
    repo: WorkshopRepository,
}

impl ApprovalService {
    pub fn new(repo: WorkshopRepository) -> Self {
        Self { repo }
    }

    /// Capture a mutation as a pending request. The payload is validated
    /// here, at submission time; the job/bill are untouched until a
    /// decision is made.
    pub async fn submit(
        &self,
        job_id: Uuid,
        requested_by: String,
        payload: ApprovalPayload,
        metadata: Option<Document>,
    ) -> Result<ApprovalRequest, ServiceError> {
        self.repo
            .find_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;
        self.validate_payload(&payload).await?;

        let request = ApprovalRequest {
            id: Uuid::new_v4(),
            job_id,
            requested_by,
            payload,
            status: ApprovalStatus::Pending,
            decided_by: None,
            decided_at: None,
            rejection_reason: None,
            metadata,
            created_at: DateTime::now(),
        };
        self.repo
            .approval_requests()
            .insert_one(&request, None)
            .await?;

        tracing::info!(
            request_id = %request.id,
            job_id = %job_id,
            request_type = request.payload.type_name(),
            requested_by = %request.requested_by,
            "Approval request submitted"
        );
        Ok(request)
    }

    async fn validate_payload(&self, payload: &ApprovalPayload) -> Result<(), ServiceError> {
        match payload {
            ApprovalPayload::Part { part_name, .. } => {
                if part_name.trim().is_empty() {
                    return Err(ServiceError::Validation(vec![
                        "part name is required".to_string()
                    ]));
                }
            }
            ApprovalPayload::Service { service_name } => {
                if service_name.trim().is_empty() {
                    return Err(ServiceError::Validation(vec![
                        "service name is required".to_string(),
                    ]));
                }
            }
            ApprovalPayload::StatusChange { .. } => {}
            ApprovalPayload::CreditPayment {
                bill_id, amount, ..
            } => {
                let bill = self
                    .repo
                    .bills()
                    .find_one(doc! { "_id": bill_id.to_string() }, None)
                    .await?
                    .ok_or(ServiceError::BillNotFound(*bill_id))?;
                if bill.payment_type != PaymentType::Credit {
                    return Err(ServiceError::PaymentNotAllowed(format!(
                        "Cannot request a payment against a {} bill",
                        bill.payment_type.as_str()
                    )));
                }
                if !bill.status.accepts_payment() {
                    return Err(ServiceError::PaymentNotAllowed(
                        "Bill does not accept payments in its current status".to_string(),
                    ));
                }
                let remaining = bill.remaining_balance.unwrap_or(bill.final_amount);
                if money::to_cents(*amount) <= 0 {
                    return Err(ServiceError::NonPositivePayment(*amount));
                }
                if money::to_cents(*amount) > money::to_cents(remaining) {
                    return Err(ServiceError::Overpayment {
                        amount: *amount,
                        remaining,
                    });
                }
            }
        }
        Ok(())
    }

    /// Decide a pending request. Approval replays the captured mutation
    /// in the same transaction as the decision stamp; rejection only
    /// stamps. A request that already left `pending` fails.
    pub async fn decide(
        &self,
        request_id: Uuid,
        decided_by: String,
        approve: bool,
        reason: Option<String>,
    ) -> Result<ApprovalRequest, ServiceError> {
        let mut session = self.repo.client().start_session(None).await?;
        session.start_transaction(None).await?;

        let result = self
            .decide_in_txn(&mut session, request_id, &decided_by, approve, &reason)
            .await;
        if let Err(err) = result {
            session.abort_transaction().await.ok();
            return Err(err);
        }
        session.commit_transaction().await?;

        let decision = if approve { "approved" } else { "rejected" };
        metrics::record_approval_decision(decision);

        let request = self
            .repo
            .approval_requests()
            .find_one(doc! { "_id": request_id.to_string() }, None)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        let audit = AuditLogEntry::new(
            "approval_decided",
            Some(decided_by),
            Some(request.job_id),
            None,
            format!("{} request {}", decision, request.payload.type_name()),
        );
        let audit_collection = self.repo.audit_log().clone();
        tokio::spawn(async move {
            let _ = audit_collection.insert_one(audit, None).await;
        });

        tracing::info!(
            request_id = %request_id,
            decision,
            request_type = request.payload.type_name(),
            "Approval request decided"
        );
        Ok(request)
    }

    async fn decide_in_txn(
        &self,
        session: &mut ClientSession,
        request_id: Uuid,
        decided_by: &str,
        approve: bool,
        reason: &Option<String>,
    ) -> Result<(), ServiceError> {
        let request = self
            .repo
            .approval_requests()
            .find_one_with_session(doc! { "_id": request_id.to_string() }, None, session)
            .await?
            .ok_or(ServiceError::RequestNotFound(request_id))?;

        if request.status != ApprovalStatus::Pending {
            return Err(ServiceError::AlreadyProcessed {
                id: request_id,
                status: request.status,
            });
        }

        let new_status = if approve {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };
        let mut set = doc! {
            "status": new_status.as_str(),
            "decided_by": decided_by,
            "decided_at": DateTime::now(),
        };
        if let Some(r) = reason {
            set.insert("rejection_reason", r.as_str());
        }

        // Conditioned on still-pending so a racing decider loses cleanly.
        let result = self
            .repo
            .approval_requests()
            .update_one_with_session(
                doc! {
                    "_id": request_id.to_string(),
                    "status": ApprovalStatus::Pending.as_str(),
                },
                doc! { "$set": set },
                None,
                session,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::AlreadyProcessed {
                id: request_id,
                status: request.status,
            });
        }

        if approve {
            self.execute_payload(session, &request, decided_by).await?;
        }
        Ok(())
    }

    async fn execute_payload(
        &self,
        session: &mut ClientSession,
        request: &ApprovalRequest,
        decided_by: &str,
    ) -> Result<(), ServiceError> {
        match &request.payload {
            ApprovalPayload::Part { part_name, brand } => {
                let subtask = SubTask {
                    id: Uuid::new_v4(),
                    kind: SubTaskKind::Parts,
                    service_name: None,
                    part_name: Some(part_name.clone()),
                    brand: brand.clone(),
                    is_completed: false,
                    approved_by: Some(decided_by.to_string()),
                    approved_at: Some(DateTime::now()),
                };
                self.push_subtask(session, request.job_id, &subtask).await
            }
            ApprovalPayload::Service { service_name } => {
                let subtask = SubTask {
                    id: Uuid::new_v4(),
                    kind: SubTaskKind::Service,
                    service_name: Some(service_name.clone()),
                    part_name: None,
                    brand: None,
                    is_completed: false,
                    approved_by: Some(decided_by.to_string()),
                    approved_at: Some(DateTime::now()),
                };
                self.push_subtask(session, request.job_id, &subtask).await
            }
            ApprovalPayload::StatusChange { new_status } => {
                let result = self
                    .repo
                    .jobs()
                    .update_one_with_session(
                        doc! { "_id": request.job_id.to_string(), "deleted": false },
                        doc! { "$set": {
                            "status": new_status.as_str(),
                            "status_changed_by": decided_by,
                            "updated_at": DateTime::now(),
                        } },
                        None,
                        session,
                    )
                    .await?;
                if result.matched_count == 0 {
                    return Err(ServiceError::JobNotFound(request.job_id));
                }
                Ok(())
            }
            ApprovalPayload::CreditPayment {
                bill_id,
                amount,
                method,
                cheque_no,
            } => {
                // The amount was validated when the request was submitted;
                // the balance recomputation clamps at zero regardless.
                let bill = self
                    .repo
                    .bills()
                    .find_one_with_session(doc! { "_id": bill_id.to_string() }, None, session)
                    .await?
                    .ok_or(ServiceError::BillNotFound(*bill_id))?;

                let current_remaining = bill.remaining_balance.unwrap_or(bill.final_amount);
                let current_cents = money::to_cents(current_remaining);
                let amount_cents = money::to_cents(*amount);
                let new_remaining = money::from_cents((current_cents - amount_cents).max(0));
                let new_status = if money::to_cents(new_remaining) == 0 {
                    BillStatus::Paid
                } else {
                    BillStatus::PartiallyPaid
                };
                let paid_at = DateTime::now();

                let payment = CreditPayment {
                    id: Uuid::new_v4(),
                    bill_id: bill.id,
                    job_id: bill.job_id,
                    amount: money::from_cents(amount_cents),
                    method: *method,
                    cheque_no: cheque_no.clone(),
                    previous_balance: money::from_cents(current_cents),
                    new_balance: new_remaining,
                    processed_by: Some(decided_by.to_string()),
                    validation_status: "pre_approved".to_string(),
                    paid_at,
                    created_at: DateTime::now(),
                };
                self.repo
                    .credit_payments()
                    .insert_one_with_session(&payment, None, session)
                    .await?;

                let entry = bson::to_bson(&StatusHistoryEntry {
                    status: new_status,
                    at: DateTime::now(),
                    reason: format!("approved payment of {} applied", payment.amount),
                })
                .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

                let result = self
                    .repo
                    .bills()
                    .update_one_with_session(
                        doc! { "_id": bill.id.to_string(), "version": bill.version },
                        doc! {
                            "$set": {
                                "remaining_balance": new_remaining,
                                "status": new_status.as_str(),
                                "last_payment_date": paid_at,
                                "is_paid_in_full": new_status == BillStatus::Paid,
                                "updated_at": DateTime::now(),
                            },
                            "$inc": { "version": 1 },
                            "$push": { "status_history": entry },
                        },
                        None,
                        session,
                    )
                    .await?;
                if result.matched_count == 0 {
                    return Err(ServiceError::ConcurrentModification);
                }
                Ok(())
            }
        }
    }

    async fn push_subtask(
        &self,
        session: &mut ClientSession,
        job_id: Uuid,
        subtask: &SubTask,
    ) -> Result<(), ServiceError> {
        let subtask_bson =
            bson::to_bson(subtask).map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;
        let result = self
            .repo
            .jobs()
            .update_one_with_session(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! {
                    "$push": { "subtasks": subtask_bson },
                    "$set": { "updated_at": DateTime::now() },
                },
                None,
                session,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }

    pub async fn find_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ApprovalRequest>, ServiceError> {
        let request = self
            .repo
            .approval_requests()
            .find_one(doc! { "_id": request_id.to_string() }, None)
            .await?;
        Ok(request)
    }

    pub async fn list_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ApprovalRequest>, ServiceError> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .repo
            .approval_requests()
            .find(filter, Some(options))
            .await?;
        let requests = cursor.try_collect().await?;
        Ok(requests)
    }
}
