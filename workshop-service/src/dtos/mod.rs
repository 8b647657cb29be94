//! Request/response bodies for the HTTP layer.

mod approvals;
mod bank;
mod billing;
mod jobs;

pub use approvals::{
    ApprovalResponse, CreateApprovalRequest, DecideApprovalRequest, ListApprovalsQuery,
};
pub use bank::{
    AdjustBalanceRequest, BankAccountResponse, BankTransactionResponse, CreateBankAccountRequest,
};
pub use billing::{
    BillResponse, ChequeDetailsResponse, CreateBillRequest, CreateBillResponse, PaymentResponse,
    RecordPaymentRequest, RecordPaymentResponse, SnapshotResponse, StatusHistoryResponse,
};
pub use jobs::{
    AddSubTaskRequest, CreateJobRequest, DeleteJobQuery, JobBoardResponse, JobResponse,
    SubTaskResponse, UpdateCustomerRequest, UpdateJobStatusRequest,
};

/// Render a bson timestamp as RFC 3339 for JSON responses.
pub(crate) fn fmt_datetime(dt: bson::DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}
