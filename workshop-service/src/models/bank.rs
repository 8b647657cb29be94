//! Bank account ledger models.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

impl TransactionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionDirection::Credit => "credit",
            TransactionDirection::Debit => "debit",
        }
    }
}

/// A ledger account with a running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
    pub balance: f64,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateBankAccount {
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
    pub opening_balance: f64,
}

/// Append-only log entry backing an account's running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: TransactionDirection,
    pub amount: f64,
    pub balance_after: f64,
    pub description: String,
    pub bill_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub recorded_by: Option<String>,
    pub created_at: DateTime,
}
