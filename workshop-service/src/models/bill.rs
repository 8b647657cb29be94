//! Bill model and its status state machine.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PaymentMethod;

/// How the customer settles a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Credit,
    Cheque,
    Unspecified,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Credit => "credit",
            PaymentType::Cheque => "cheque",
            PaymentType::Unspecified => "unspecified",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "cash" => PaymentType::Cash,
            "credit" => PaymentType::Credit,
            "cheque" => PaymentType::Cheque,
            _ => PaymentType::Unspecified,
        }
    }

    /// Non-cash settlements post a transaction to the linked bank account.
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentType::Cash)
    }
}

/// Bill lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Draft,
    Finalized,
    PartiallyPaid,
    Paid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "draft",
            BillStatus::Finalized => "finalized",
            BillStatus::PartiallyPaid => "partially_paid",
            BillStatus::Paid => "paid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "finalized" => BillStatus::Finalized,
            "partially_paid" => BillStatus::PartiallyPaid,
            "paid" => BillStatus::Paid,
            _ => BillStatus::Draft,
        }
    }

    /// Legal status transitions. Self-loops are allowed everywhere except
    /// where noted so that idempotent rewrites of the same status pass.
    pub fn can_transition_to(&self, target: BillStatus) -> bool {
        use BillStatus::*;
        matches!(
            (*self, target),
            (Draft, Draft)
                | (Draft, Finalized)
                | (Finalized, Finalized)
                | (Finalized, PartiallyPaid)
                | (Finalized, Paid)
                | (PartiallyPaid, PartiallyPaid)
                | (PartiallyPaid, Paid)
                | (Paid, Paid)
        )
    }

    /// Statuses against which a credit payment may be recorded.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, BillStatus::Finalized | BillStatus::PartiallyPaid)
    }
}

/// One entry in a bill's ordered status log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: BillStatus,
    pub at: DateTime,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChequeDetails {
    pub cheque_no: String,
    pub bank_name: Option<String>,
    pub cheque_date: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditDetails {
    pub due_date: Option<DateTime>,
    pub notes: Option<String>,
}

/// The billing record for exactly one job.
///
/// `remaining_balance` is `None` only on legacy documents written before
/// balances were tracked; an explicit 0.0 is a real, fully-paid value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub job_id: Uuid,
    pub vehicle_no: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
    pub total_amount: f64,
    pub commission: f64,
    pub final_amount: f64,
    pub payment_type: PaymentType,
    pub status: BillStatus,
    pub initial_payment: f64,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
    pub cheque_details: Option<ChequeDetails>,
    pub credit_details: Option<CreditDetails>,
    pub bank_account_id: Option<Uuid>,
    pub version: i64,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
    pub last_payment_date: Option<DateTime>,
    #[serde(default)]
    pub is_paid_in_full: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Input for creating a bill.
#[derive(Debug, Clone)]
pub struct CreateBill {
    pub job_id: Uuid,
    pub vehicle_no: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub descriptions: Vec<String>,
    pub total_amount: f64,
    pub commission: f64,
    pub payment_type: PaymentType,
    pub initial_payment: f64,
    pub cheque_details: Option<ChequeDetails>,
    pub credit_details: Option<CreditDetails>,
    pub bank_account_id: Option<Uuid>,
    pub created_by: Option<String>,
}

/// Summary of the payment that produced a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub payment_id: Uuid,
    pub amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub method: PaymentMethod,
    pub paid_at: DateTime,
}

/// Immutable point-in-time copy of a bill, generated after each payment
/// for reprinting. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSnapshot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub bill_id: Uuid,
    pub job_id: Uuid,
    pub vehicle_no: String,
    pub customer_name: String,
    pub final_amount: f64,
    pub remaining_balance: f64,
    pub status: BillStatus,
    pub payment: PaymentSummary,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BillStatus; 4] = [
        BillStatus::Draft,
        BillStatus::Finalized,
        BillStatus::PartiallyPaid,
        BillStatus::Paid,
    ];

    #[test]
    fn draft_can_only_stay_or_finalize() {
        assert!(BillStatus::Draft.can_transition_to(BillStatus::Draft));
        assert!(BillStatus::Draft.can_transition_to(BillStatus::Finalized));
        assert!(!BillStatus::Draft.can_transition_to(BillStatus::PartiallyPaid));
        assert!(!BillStatus::Draft.can_transition_to(BillStatus::Paid));
    }

    #[test]
    fn finalized_moves_toward_payment() {
        assert!(!BillStatus::Finalized.can_transition_to(BillStatus::Draft));
        assert!(BillStatus::Finalized.can_transition_to(BillStatus::Finalized));
        assert!(BillStatus::Finalized.can_transition_to(BillStatus::PartiallyPaid));
        assert!(BillStatus::Finalized.can_transition_to(BillStatus::Paid));
    }

    #[test]
    fn partially_paid_cannot_regress() {
        assert!(!BillStatus::PartiallyPaid.can_transition_to(BillStatus::Draft));
        assert!(!BillStatus::PartiallyPaid.can_transition_to(BillStatus::Finalized));
        assert!(BillStatus::PartiallyPaid.can_transition_to(BillStatus::PartiallyPaid));
        assert!(BillStatus::PartiallyPaid.can_transition_to(BillStatus::Paid));
    }

    #[test]
    fn paid_is_terminal() {
        for target in ALL {
            assert_eq!(
                BillStatus::Paid.can_transition_to(target),
                target == BillStatus::Paid
            );
        }
    }

    #[test]
    fn only_finalized_and_partially_paid_accept_payments() {
        assert!(!BillStatus::Draft.accepts_payment());
        assert!(BillStatus::Finalized.accepts_payment());
        assert!(BillStatus::PartiallyPaid.accepts_payment());
        assert!(!BillStatus::Paid.accepts_payment());
    }
}
