mod approval;
mod bank;
mod billing;
mod error;
pub mod metrics;
pub mod money;
mod repository;

pub use approval::ApprovalService;
pub use bank::BankService;
pub use billing::{
    validate_bill_data, BillCreation, BillingService, PaymentOutcome, RecordPayment,
};
pub use error::ServiceError;
pub use metrics::get_metrics;
pub use repository::WorkshopRepository;

/// Warning prefixes for post-commit side effects that failed after the
/// primary transaction already committed.
pub const WARN_BANK_LEDGER: &str = "bank ledger update failed";
pub const WARN_SNAPSHOT: &str = "bill snapshot generation failed";
