//! MongoDB collection wrapper for workshop-service.
//!
//! Holds the typed collection handles and the simple (single-document)
//! job operations. Multi-document flows (billing, approvals, bank
//! ledger) run in their own services on top of the collection accessors
//! and `ClientSession` transactions.

use bson::doc;
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use uuid::Uuid;

use crate::models::{
    ApprovalRequest, AuditLogEntry, BankAccount, BankTransaction, Bill, BillSnapshot, CreateJob,
    CreditPayment, Job, JobBoard, JobStatus, SubTask,
};
use crate::services::error::ServiceError;

#[derive(Clone)]
pub struct WorkshopRepository {
    client: Client,
    jobs: Collection<Job>,
    bills: Collection<Bill>,
    bill_snapshots: Collection<BillSnapshot>,
    credit_payments: Collection<CreditPayment>,
    approval_requests: Collection<ApprovalRequest>,
    bank_accounts: Collection<BankAccount>,
    bank_transactions: Collection<BankTransaction>,
    audit_log: Collection<AuditLogEntry>,
}

impl WorkshopRepository {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            jobs: db.collection("jobs"),
            bills: db.collection("bills"),
            bill_snapshots: db.collection("bill_snapshots"),
            credit_payments: db.collection("credit_payments"),
            approval_requests: db.collection("approval_requests"),
            bank_accounts: db.collection("bank_accounts"),
            bank_transactions: db.collection("bank_transactions"),
            audit_log: db.collection("audit_log"),
        }
    }

    /// The client owning the collections; sessions for multi-document
    /// transactions are started from here.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn jobs(&self) -> &Collection<Job> {
        &self.jobs
    }

    pub fn bills(&self) -> &Collection<Bill> {
        &self.bills
    }

    pub fn bill_snapshots(&self) -> &Collection<BillSnapshot> {
        &self.bill_snapshots
    }

    pub fn credit_payments(&self) -> &Collection<CreditPayment> {
        &self.credit_payments
    }

    pub fn approval_requests(&self) -> &Collection<ApprovalRequest> {
        &self.approval_requests
    }

    pub fn bank_accounts(&self) -> &Collection<BankAccount> {
        &self.bank_accounts
    }

    pub fn bank_transactions(&self) -> &Collection<BankTransaction> {
        &self.bank_transactions
    }

    pub fn audit_log(&self) -> &Collection<AuditLogEntry> {
        &self.audit_log
    }

    /// Initialize indexes.
    ///
    /// `bills.job_id` is genuinely unique: at most one primary bill per
    /// job (snapshots live in their own collection). The job-per-vehicle
    /// invariant cannot be a partial unique index because it excludes a
    /// status value, so it stays a pre-insert check plus a lookup index.
    pub async fn init_indexes(&self) -> Result<(), mongodb::error::Error> {
        let bill_job_index = IndexModel::builder()
            .keys(doc! { "job_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_bill_per_job_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.bills.create_indexes([bill_job_index], None).await?;

        let vehicle_index = IndexModel::builder()
            .keys(doc! { "vehicle_no": 1, "deleted": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("vehicle_lookup_idx".to_string())
                    .build(),
            )
            .build();
        self.jobs.create_indexes([vehicle_index], None).await?;

        let payment_index = IndexModel::builder()
            .keys(doc! { "bill_id": 1, "paid_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("bill_payments_idx".to_string())
                    .build(),
            )
            .build();
        self.credit_payments
            .create_indexes([payment_index], None)
            .await?;

        let approval_index = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("approval_status_idx".to_string())
                    .build(),
            )
            .build();
        self.approval_requests
            .create_indexes([approval_index], None)
            .await?;

        let bank_txn_index = IndexModel::builder()
            .keys(doc! { "account_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("account_transactions_idx".to_string())
                    .build(),
            )
            .build();
        self.bank_transactions
            .create_indexes([bank_txn_index], None)
            .await?;

        tracing::info!("Workshop service indexes initialized");
        Ok(())
    }

    // =========================================================================
    // Job operations
    // =========================================================================

    /// Create a job, rejecting a second active (non-delivered, non-deleted)
    /// job for the same vehicle.
    pub async fn create_job(&self, input: CreateJob) -> Result<Job, ServiceError> {
        let duplicate = self
            .jobs
            .find_one(
                doc! {
                    "vehicle_no": &input.vehicle_no,
                    "deleted": false,
                    "status": { "$ne": JobStatus::Delivered.as_str() },
                },
                None,
            )
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::DuplicateVehicle(input.vehicle_no));
        }

        let now = bson::DateTime::now();
        let job = Job {
            id: Uuid::new_v4(),
            vehicle_no: input.vehicle_no,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            damage_remarks: input.damage_remarks,
            photos: input.photos,
            subtasks: Vec::new(),
            status: JobStatus::Todo,
            is_company_vehicle: input.is_company_vehicle,
            deleted: false,
            status_changed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.insert_one(&job, None).await?;

        tracing::info!(job_id = %job.id, vehicle_no = %job.vehicle_no, "Job created");
        Ok(job)
    }

    pub async fn find_job(&self, job_id: Uuid) -> Result<Option<Job>, ServiceError> {
        let job = self
            .jobs
            .find_one(doc! { "_id": job_id.to_string(), "deleted": false }, None)
            .await?;
        Ok(job)
    }

    /// All non-deleted jobs grouped by pipeline column, newest first.
    pub async fn get_jobs_board(&self) -> Result<JobBoard, ServiceError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.jobs.find(doc! { "deleted": false }, Some(options)).await?;
        let jobs: Vec<Job> = cursor.try_collect().await?;

        let mut board = JobBoard::default();
        for job in jobs {
            match job.status {
                JobStatus::Todo => board.todo.push(job),
                JobStatus::InProgress => board.in_progress.push(job),
                JobStatus::Finished => board.finished.push(job),
                JobStatus::Delivered => board.delivered.push(job),
            }
        }
        Ok(board)
    }

    pub async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        changed_by: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut set = doc! {
            "status": status.as_str(),
            "updated_at": bson::DateTime::now(),
        };
        if let Some(actor) = changed_by {
            set.insert("status_changed_by", actor);
        }

        let result = self
            .jobs
            .update_one(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }

    /// Append a subtask. Subtask array writes are deliberately not
    /// version-guarded; concurrent edits last-write-win at the array level.
    pub async fn add_subtask(&self, job_id: Uuid, subtask: &SubTask) -> Result<(), ServiceError> {
        let subtask_bson =
            bson::to_bson(subtask).map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;
        let result = self
            .jobs
            .update_one(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! {
                    "$push": { "subtasks": subtask_bson },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }

    pub async fn remove_subtask(&self, job_id: Uuid, subtask_id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .jobs
            .update_one(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! {
                    "$pull": { "subtasks": { "id": subtask_id.to_string() } },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        if result.modified_count == 0 {
            return Err(ServiceError::SubTaskNotFound(subtask_id));
        }
        Ok(())
    }

    pub async fn update_customer_details(
        &self,
        job_id: Uuid,
        customer_name: Option<String>,
        customer_phone: Option<String>,
        damage_remarks: Option<String>,
    ) -> Result<(), ServiceError> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(name) = customer_name {
            set.insert("customer_name", name);
        }
        if let Some(phone) = customer_phone {
            set.insert("customer_phone", phone);
        }
        if let Some(remarks) = damage_remarks {
            set.insert("damage_remarks", remarks);
        }

        let result = self
            .jobs
            .update_one(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }

    /// Soft delete: the main removal flow. The document stays for audit.
    pub async fn soft_delete_job(&self, job_id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .jobs
            .update_one(
                doc! { "_id": job_id.to_string(), "deleted": false },
                doc! { "$set": { "deleted": true, "updated_at": bson::DateTime::now() } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }

    /// Hard delete: explicit, irreversible removal path.
    pub async fn hard_delete_job(&self, job_id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .jobs
            .delete_one(doc! { "_id": job_id.to_string() }, None)
            .await?;
        if result.deleted_count == 0 {
            return Err(ServiceError::JobNotFound(job_id));
        }
        Ok(())
    }
}
