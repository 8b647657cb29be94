use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ApprovalStatus, BillStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Bill {0} not found")]
    BillNotFound(Uuid),

    #[error("Subtask {0} not found")]
    SubTaskNotFound(Uuid),

    #[error("Approval request {0} not found")]
    RequestNotFound(Uuid),

    #[error("Bank account {0} not found")]
    AccountNotFound(Uuid),

    #[error("An active job already exists for vehicle {0}")]
    DuplicateVehicle(String),

    #[error("Invalid status transition from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: BillStatus, to: BillStatus },

    #[error("Bill was modified by another process; refresh and retry")]
    ConcurrentModification,

    #[error("Request {id} already {}", .status.as_str())]
    AlreadyProcessed { id: Uuid, status: ApprovalStatus },

    #[error("{0}")]
    PaymentNotAllowed(String),

    #[error("Payment amount must be greater than zero (got {0})")]
    NonPositivePayment(f64),

    #[error("Payment amount ({amount}) cannot exceed remaining balance ({remaining})")]
    Overpayment { amount: f64, remaining: f64 },

    #[error("Debit of {amount} would overdraw account balance {balance}")]
    InsufficientFunds { balance: f64, amount: f64 },
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::Validation(_) => AppError::BadRequest(anyhow::anyhow!("{}", err)),
            ServiceError::JobNotFound(_)
            | ServiceError::BillNotFound(_)
            | ServiceError::SubTaskNotFound(_)
            | ServiceError::RequestNotFound(_)
            | ServiceError::AccountNotFound(_) => AppError::NotFound(anyhow::anyhow!("{}", err)),
            ServiceError::DuplicateVehicle(_)
            | ServiceError::ConcurrentModification
            | ServiceError::AlreadyProcessed { .. } => {
                AppError::Conflict(anyhow::anyhow!("{}", err))
            }
            ServiceError::InvalidTransition { .. }
            | ServiceError::PaymentNotAllowed(_)
            | ServiceError::NonPositivePayment(_)
            | ServiceError::Overpayment { .. }
            | ServiceError::InsufficientFunds { .. } => {
                AppError::BadRequest(anyhow::anyhow!("{}", err))
            }
        }
    }
}
