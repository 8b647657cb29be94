//! Bill lifecycle and the credit-payment ledger.
//!
//! Every read-validate-write sequence against a bill runs inside one
//! MongoDB transaction; financial bill updates are additionally
//! conditioned on the version the caller read. Bank-ledger posting and
//! snapshot generation happen after commit as best-effort steps whose
//! failures are collected into the returned warnings, never re-raised.

use bson::{doc, DateTime};
use mongodb::options::FindOneOptions;
use mongodb::ClientSession;
use uuid::Uuid;

use crate::models::{
    AuditLogEntry, Bill, BillSnapshot, BillStatus, CreateBill, CreditPayment, PaymentMethod,
    PaymentSummary, PaymentType, StatusHistoryEntry, SubTask, TransactionDirection,
};
use crate::services::bank::BankService;
use crate::services::error::ServiceError;
use crate::services::money;
use crate::services::repository::WorkshopRepository;
use crate::services::{metrics, WARN_BANK_LEDGER, WARN_SNAPSHOT};

/// Result of a bill-creation call.
#[derive(Debug, Clone)]
pub struct BillCreation {
    pub bill_id: Uuid,
    pub is_existing: bool,
    pub warnings: Vec<String>,
}

/// Input for recording a credit payment.
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub bill_id: Uuid,
    pub amount: f64,
    pub method: PaymentMethod,
    pub cheque_no: Option<String>,
    pub paid_at: Option<DateTime>,
    pub processed_by: Option<String>,
}

/// Result of recording a credit payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment_id: Uuid,
    pub payment_amount: f64,
    pub new_remaining_balance: f64,
    pub is_paid_in_full: bool,
    pub snapshot_id: Option<Uuid>,
    pub warnings: Vec<String>,
}

/// Pre-create gate. All failures aggregate into one error; no partial
/// bill is ever written.
pub fn validate_bill_data(input: &CreateBill) -> Result<(), ServiceError> {
    let mut errors = Vec::new();

    if input.vehicle_no.trim().is_empty() {
        errors.push("vehicle number is required".to_string());
    }
    if input.customer_name.trim().is_empty() {
        errors.push("customer name is required".to_string());
    }
    if input.customer_phone.trim().is_empty() {
        errors.push("customer phone is required".to_string());
    }
    if money::to_cents(input.total_amount) <= 0 {
        errors.push(format!(
            "total amount must be positive (got {})",
            input.total_amount
        ));
    }
    if money::to_cents(input.commission) < 0 {
        errors.push(format!(
            "commission cannot be negative (got {})",
            input.commission
        ));
    }
    if money::to_cents(input.initial_payment) < 0 {
        errors.push(format!(
            "initial payment cannot be negative (got {})",
            input.initial_payment
        ));
    }

    if input.payment_type == PaymentType::Credit {
        let final_cents = money::to_cents(input.total_amount) + money::to_cents(input.commission);
        if money::to_cents(input.initial_payment) > final_cents {
            errors.push(format!(
                "initial payment ({}) cannot exceed final amount ({})",
                input.initial_payment,
                money::from_cents(final_cents)
            ));
        }
    }

    if input.payment_type == PaymentType::Cheque {
        let has_cheque_no = input
            .cheque_details
            .as_ref()
            .map(|d| !d.cheque_no.trim().is_empty())
            .unwrap_or(false);
        if !has_cheque_no {
            errors.push("cheque bills require a cheque number".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

enum CreateOutcome {
    Existing(Uuid),
    Created(Box<Bill>),
}

#[derive(Clone)]
pub struct BillingService {
    repo: WorkshopRepository,
    bank: BankService,
}

impl BillingService {
    pub fn new(repo: WorkshopRepository, bank: BankService) -> Self {
        Self { repo, bank }
    }

    // =========================================================================
    // Bill lifecycle
    // =========================================================================

    /// Create a bill for a job, idempotently: a second call for the same
    /// job returns the existing bill's id with `is_existing: true`
    /// instead of creating a duplicate.
    pub async fn create_bill(
        &self,
        input: CreateBill,
        additional_services: Vec<String>,
        finalize: bool,
    ) -> Result<BillCreation, ServiceError> {
        validate_bill_data(&input)?;

        let mut session = self.repo.client().start_session(None).await?;
        session.start_transaction(None).await?;

        let outcome = match self
            .create_bill_in_txn(&mut session, &input, &additional_services, finalize)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                session.abort_transaction().await.ok();
                // A unique-index race on job_id means another writer created
                // the bill between our existence check and insert; resolve
                // it the same way the fast path does.
                if let ServiceError::Database(db_err) = &err {
                    if is_duplicate_key(db_err) {
                        if let Some(existing) = self.find_bill_by_job(input.job_id).await? {
                            return Ok(BillCreation {
                                bill_id: existing.id,
                                is_existing: true,
                                warnings: Vec::new(),
                            });
                        }
                    }
                }
                return Err(err);
            }
        };

        session.commit_transaction().await?;

        match outcome {
            CreateOutcome::Existing(bill_id) => Ok(BillCreation {
                bill_id,
                is_existing: true,
                warnings: Vec::new(),
            }),
            CreateOutcome::Created(bill) => {
                metrics::record_bill_created(bill.status.as_str());
                let mut warnings = Vec::new();

                if finalize && !input.payment_type.is_cash() {
                    if let Some(account_id) = bill.bank_account_id {
                        if let Err(e) = self
                            .bank
                            .update_balance(
                                account_id,
                                bill.final_amount,
                                TransactionDirection::Credit,
                                format!(
                                    "Bill {} finalized for vehicle {}",
                                    bill.id, bill.vehicle_no
                                ),
                                Some(bill.id),
                                None,
                                input.created_by.clone(),
                            )
                            .await
                        {
                            tracing::warn!(bill_id = %bill.id, error = %e, "Bank ledger update failed after bill creation");
                            warnings.push(format!("{WARN_BANK_LEDGER}: {e}"));
                        }
                    }
                }

                let audit = AuditLogEntry::new(
                    "bill_created",
                    input.created_by.clone(),
                    Some(bill.job_id),
                    Some(bill.id),
                    format!(
                        "{} bill for {} (final amount {})",
                        bill.status.as_str(),
                        bill.vehicle_no,
                        bill.final_amount
                    ),
                );
                let audit_collection = self.repo.audit_log().clone();
                tokio::spawn(async move {
                    let _ = audit_collection.insert_one(audit, None).await;
                });

                tracing::info!(
                    bill_id = %bill.id,
                    job_id = %bill.job_id,
                    final_amount = bill.final_amount,
                    status = bill.status.as_str(),
                    "Bill created"
                );

                Ok(BillCreation {
                    bill_id: bill.id,
                    is_existing: false,
                    warnings,
                })
            }
        }
    }

    async fn create_bill_in_txn(
        &self,
        session: &mut ClientSession,
        input: &CreateBill,
        additional_services: &[String],
        finalize: bool,
    ) -> Result<CreateOutcome, ServiceError> {
        if let Some(existing) = self
            .repo
            .bills()
            .find_one_with_session(doc! { "job_id": input.job_id.to_string() }, None, session)
            .await?
        {
            return Ok(CreateOutcome::Existing(existing.id));
        }

        let job = self
            .repo
            .jobs()
            .find_one_with_session(
                doc! { "_id": input.job_id.to_string(), "deleted": false },
                None,
                session,
            )
            .await?
            .ok_or(ServiceError::JobNotFound(input.job_id))?;

        if !additional_services.is_empty() {
            let subtasks: Vec<bson::Bson> = additional_services
                .iter()
                .map(|name| {
                    bson::to_bson(&SubTask::completed_service(
                        name,
                        input.created_by.as_deref(),
                    ))
                })
                .collect::<Result<_, _>>()
                .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;
            self.repo
                .jobs()
                .update_one_with_session(
                    doc! { "_id": job.id.to_string() },
                    doc! {
                        "$push": { "subtasks": { "$each": subtasks } },
                        "$set": { "updated_at": DateTime::now() },
                    },
                    None,
                    session,
                )
                .await?;
        }

        let amounts = money::calculate_financial_amounts(
            input.total_amount,
            input.commission,
            input.initial_payment,
        );
        let now = DateTime::now();
        let status = if finalize {
            BillStatus::Finalized
        } else {
            BillStatus::Draft
        };
        let seed_reason = if finalize {
            "bill created and finalized"
        } else {
            "draft bill created"
        };

        let bill = Bill {
            id: Uuid::new_v4(),
            job_id: job.id,
            vehicle_no: input.vehicle_no.clone(),
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            descriptions: input.descriptions.clone(),
            total_amount: amounts.total_amount,
            commission: amounts.commission,
            final_amount: amounts.final_amount,
            payment_type: input.payment_type,
            status,
            initial_payment: money::round2(input.initial_payment),
            remaining_balance: Some(amounts.remaining_balance),
            cheque_details: input.cheque_details.clone(),
            credit_details: input.credit_details.clone(),
            bank_account_id: input.bank_account_id,
            version: 0,
            status_history: vec![StatusHistoryEntry {
                status,
                at: now,
                reason: seed_reason.to_string(),
            }],
            last_payment_date: None,
            is_paid_in_full: false,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .bills()
            .insert_one_with_session(&bill, None, session)
            .await?;

        Ok(CreateOutcome::Created(Box::new(bill)))
    }

    /// Transition a draft to `finalized`. Any other current status is
    /// rejected before the state machine is even consulted.
    pub async fn finalize_bill(&self, bill_id: Uuid) -> Result<Bill, ServiceError> {
        let bill = self
            .find_bill(bill_id)
            .await?
            .ok_or(ServiceError::BillNotFound(bill_id))?;

        if bill.status != BillStatus::Draft {
            return Err(ServiceError::InvalidTransition {
                from: bill.status,
                to: BillStatus::Finalized,
            });
        }

        self.transition_bill_status(&bill, BillStatus::Finalized, "draft finalized")
            .await?;

        self.find_bill(bill_id)
            .await?
            .ok_or(ServiceError::BillNotFound(bill_id))
    }

    /// Apply a status transition with the optimistic-concurrency guard:
    /// the write is conditioned on the version the caller read, appends a
    /// status-history entry and bumps the version. A zero-match means a
    /// concurrent writer got there first.
    pub async fn transition_bill_status(
        &self,
        bill: &Bill,
        target: BillStatus,
        reason: &str,
    ) -> Result<(), ServiceError> {
        if !bill.status.can_transition_to(target) {
            return Err(ServiceError::InvalidTransition {
                from: bill.status,
                to: target,
            });
        }

        let entry = bson::to_bson(&StatusHistoryEntry {
            status: target,
            at: DateTime::now(),
            reason: reason.to_string(),
        })
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        let result = self
            .repo
            .bills()
            .update_one(
                doc! { "_id": bill.id.to_string(), "version": bill.version },
                doc! {
                    "$set": { "status": target.as_str(), "updated_at": DateTime::now() },
                    "$inc": { "version": 1 },
                    "$push": { "status_history": entry },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::ConcurrentModification);
        }
        Ok(())
    }

    // =========================================================================
    // Credit payment ledger
    // =========================================================================

    /// Record a payment against a credit bill.
    ///
    /// The read-validate-write core commits in one transaction; the bank
    /// ledger posting and the printable snapshot are post-commit steps
    /// whose failures surface only as warnings.
    pub async fn record_payment(
        &self,
        input: RecordPayment,
    ) -> Result<PaymentOutcome, ServiceError> {
        let mut session = self.repo.client().start_session(None).await?;
        session.start_transaction(None).await?;

        let result = self.record_payment_in_txn(&mut session, &input).await;
        let (bill, payment, new_remaining, new_status) = match result {
            Ok(v) => v,
            Err(err) => {
                session.abort_transaction().await.ok();
                return Err(err);
            }
        };
        session.commit_transaction().await?;

        let is_paid_in_full = new_status == BillStatus::Paid;
        metrics::record_payment(
            input.method.as_str(),
            money::to_cents(payment.amount).max(0) as u64,
        );

        let mut warnings = Vec::new();

        if !input.method.is_cash() {
            if let Some(account_id) = bill.bank_account_id {
                if let Err(e) = self
                    .bank
                    .update_balance(
                        account_id,
                        payment.amount,
                        TransactionDirection::Credit,
                        format!("Credit payment against bill {}", bill.id),
                        Some(bill.id),
                        Some(payment.id),
                        input.processed_by.clone(),
                    )
                    .await
                {
                    tracing::warn!(bill_id = %bill.id, error = %e, "Bank ledger update failed after payment");
                    warnings.push(format!("{WARN_BANK_LEDGER}: {e}"));
                }
            }
        }

        let snapshot = BillSnapshot {
            id: Uuid::new_v4(),
            bill_id: bill.id,
            job_id: bill.job_id,
            vehicle_no: bill.vehicle_no.clone(),
            customer_name: bill.customer_name.clone(),
            final_amount: bill.final_amount,
            remaining_balance: new_remaining,
            status: new_status,
            payment: PaymentSummary {
                payment_id: payment.id,
                amount: payment.amount,
                previous_balance: payment.previous_balance,
                new_balance: payment.new_balance,
                method: payment.method,
                paid_at: payment.paid_at,
            },
            created_at: DateTime::now(),
        };
        let snapshot_id = match self.repo.bill_snapshots().insert_one(&snapshot, None).await {
            Ok(_) => Some(snapshot.id),
            Err(e) => {
                tracing::warn!(bill_id = %bill.id, error = %e, "Snapshot generation failed after payment");
                warnings.push(format!("{WARN_SNAPSHOT}: {e}"));
                None
            }
        };

        let audit = AuditLogEntry::new(
            "credit_payment_recorded",
            input.processed_by.clone(),
            Some(bill.job_id),
            Some(bill.id),
            format!(
                "payment of {} via {}, remaining balance {}",
                payment.amount,
                payment.method.as_str(),
                new_remaining
            ),
        );
        let audit_collection = self.repo.audit_log().clone();
        tokio::spawn(async move {
            let _ = audit_collection.insert_one(audit, None).await;
        });

        tracing::info!(
            bill_id = %bill.id,
            payment_id = %payment.id,
            amount = payment.amount,
            new_remaining_balance = new_remaining,
            is_paid_in_full,
            "Credit payment recorded"
        );

        Ok(PaymentOutcome {
            payment_id: payment.id,
            payment_amount: payment.amount,
            new_remaining_balance: new_remaining,
            is_paid_in_full,
            snapshot_id,
            warnings,
        })
    }

    async fn record_payment_in_txn(
        &self,
        session: &mut ClientSession,
        input: &RecordPayment,
    ) -> Result<(Bill, CreditPayment, f64, BillStatus), ServiceError> {
        let bill = self
            .repo
            .bills()
            .find_one_with_session(doc! { "_id": input.bill_id.to_string() }, None, session)
            .await?
            .ok_or(ServiceError::BillNotFound(input.bill_id))?;

        if bill.payment_type != PaymentType::Credit {
            return Err(ServiceError::PaymentNotAllowed(format!(
                "Cannot record a payment against a {} bill; only credit bills carry a balance",
                bill.payment_type.as_str()
            )));
        }
        if !bill.status.accepts_payment() {
            let detail = match bill.status {
                BillStatus::Draft => "bill is still a draft",
                BillStatus::Paid => "bill is already paid in full",
                _ => "bill does not accept payments in its current status",
            };
            return Err(ServiceError::PaymentNotAllowed(format!(
                "Cannot record a payment: {detail}"
            )));
        }

        // An explicit 0 is a real balance; only a missing field falls back
        // to the final amount (first payment against a legacy bill).
        let current_remaining = bill.remaining_balance.unwrap_or(bill.final_amount);

        let amount_cents = money::to_cents(input.amount);
        let current_cents = money::to_cents(current_remaining);
        if amount_cents <= 0 {
            return Err(ServiceError::NonPositivePayment(input.amount));
        }
        if amount_cents > current_cents {
            return Err(ServiceError::Overpayment {
                amount: money::from_cents(amount_cents),
                remaining: money::from_cents(current_cents),
            });
        }

        let new_remaining = money::from_cents((current_cents - amount_cents).max(0));
        let new_status = if money::to_cents(new_remaining) == 0 {
            BillStatus::Paid
        } else {
            BillStatus::PartiallyPaid
        };
        let paid_at = input.paid_at.unwrap_or_else(DateTime::now);

        let payment = CreditPayment {
            id: Uuid::new_v4(),
            bill_id: bill.id,
            job_id: bill.job_id,
            amount: money::from_cents(amount_cents),
            method: input.method,
            cheque_no: input.cheque_no.clone(),
            previous_balance: money::from_cents(current_cents),
            new_balance: new_remaining,
            processed_by: input.processed_by.clone(),
            validation_status: "validated".to_string(),
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
            reason: format!("payment of {} received", payment.amount),
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

        Ok((bill, payment, new_remaining, new_status))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn find_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, ServiceError> {
        let bill = self
            .repo
            .bills()
            .find_one(doc! { "_id": bill_id.to_string() }, None)
            .await?;
        Ok(bill)
    }

    pub async fn find_bill_by_job(&self, job_id: Uuid) -> Result<Option<Bill>, ServiceError> {
        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let bill = self
            .repo
            .bills()
            .find_one(doc! { "job_id": job_id.to_string() }, Some(options))
            .await?;
        Ok(bill)
    }

    /// Resolve an id that may be either a bill id or a job id; the job
    /// fallback returns that job's most recent bill.
    pub async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>, ServiceError> {
        if let Some(bill) = self.find_bill(id).await? {
            return Ok(Some(bill));
        }
        self.find_bill_by_job(id).await
    }

    /// Date-ordered payments for a bill: the derivable source of truth
    /// for its remaining balance.
    pub async fn get_payment_history(
        &self,
        bill_id: Uuid,
    ) -> Result<Vec<CreditPayment>, ServiceError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "paid_at": 1 }).build();
        let cursor = self
            .repo
            .credit_payments()
            .find(doc! { "bill_id": bill_id.to_string() }, Some(options))
            .await?;
        let payments = cursor.try_collect().await?;
        Ok(payments)
    }

    pub async fn get_snapshots(&self, bill_id: Uuid) -> Result<Vec<BillSnapshot>, ServiceError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .repo
            .bill_snapshots()
            .find(doc! { "bill_id": bill_id.to_string() }, Some(options))
            .await?;
        let snapshots = cursor.try_collect().await?;
        Ok(snapshots)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we))
            if we.code == 11000
    )
}
