use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::fmt_datetime;
use crate::models::{BankAccount, BankTransaction, TransactionDirection};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBankAccountRequest {
    #[validate(length(min = 1, message = "account name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "account number is required"))]
    pub account_number: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub opening_balance: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustBalanceRequest {
    pub amount: f64,
    pub direction: TransactionDirection,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub bill_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub recorded_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BankAccountResponse {
    pub id: Uuid,
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
    pub balance: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BankAccount> for BankAccountResponse {
    fn from(a: BankAccount) -> Self {
        Self {
            id: a.id,
            name: a.name,
            account_number: a.account_number,
            bank_name: a.bank_name,
            balance: a.balance,
            is_active: a.is_active,
            created_at: fmt_datetime(a.created_at),
            updated_at: fmt_datetime(a.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BankTransactionResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: TransactionDirection,
    pub amount: f64,
    pub balance_after: f64,
    pub description: String,
    pub bill_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub recorded_by: Option<String>,
    pub created_at: String,
}

impl From<BankTransaction> for BankTransactionResponse {
    fn from(t: BankTransaction) -> Self {
        Self {
            id: t.id,
            account_id: t.account_id,
            direction: t.direction,
            amount: t.amount,
            balance_after: t.balance_after,
            description: t.description,
            bill_id: t.bill_id,
            payment_id: t.payment_id,
            recorded_by: t.recorded_by,
            created_at: fmt_datetime(t.created_at),
        }
    }
}
