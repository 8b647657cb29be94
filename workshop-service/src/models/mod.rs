//! Domain models for workshop-service.

mod approval;
mod audit;
mod bank;
mod bill;
mod credit_payment;
mod job;

pub use approval::{ApprovalPayload, ApprovalRequest, ApprovalStatus};
pub use audit::AuditLogEntry;
pub use bank::{BankAccount, BankTransaction, CreateBankAccount, TransactionDirection};
pub use bill::{
    Bill, BillSnapshot, BillStatus, ChequeDetails, CreateBill, CreditDetails, PaymentSummary,
    PaymentType, StatusHistoryEntry,
};
pub use credit_payment::{CreditPayment, PaymentMethod};
pub use job::{CreateJob, Job, JobBoard, JobStatus, SubTask, SubTaskKind};
