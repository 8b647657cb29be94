//! Credit payment model.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a single credit payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Upi,
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "upi" => PaymentMethod::Upi,
            "bank_transfer" => PaymentMethod::BankTransfer,
            "cheque" => PaymentMethod::Cheque,
            _ => PaymentMethod::Cash,
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

/// One payment event against a bill. Immutable once created; the
/// date-ordered set for a bill is the source of truth from which the
/// bill's remaining balance is derivable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub bill_id: Uuid,
    pub job_id: Uuid,
    pub amount: f64,
    pub method: PaymentMethod,
    pub cheque_no: Option<String>,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub processed_by: Option<String>,
    pub validation_status: String,
    pub paid_at: DateTime,
    pub created_at: DateTime,
}
