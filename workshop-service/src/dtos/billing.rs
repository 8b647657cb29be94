use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dtos::fmt_datetime;
use crate::models::{
    Bill, BillSnapshot, BillStatus, ChequeDetails, CreateBill, CreditDetails, CreditPayment,
    PaymentMethod, PaymentType,
};
use crate::services::{BillCreation, PaymentOutcome};

#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub vehicle_no: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub commission: f64,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub initial_payment: f64,
    pub cheque_no: Option<String>,
    pub cheque_bank_name: Option<String>,
    pub credit_notes: Option<String>,
    pub bank_account_id: Option<Uuid>,
    #[serde(default)]
    pub additional_services: Vec<String>,
    pub created_by: Option<String>,
}

impl CreateBillRequest {
    pub fn into_parts(self) -> (CreateBill, Vec<String>) {
        let cheque_details = self.cheque_no.map(|cheque_no| ChequeDetails {
            cheque_no,
            bank_name: self.cheque_bank_name,
            cheque_date: None,
        });
        let credit_details = self.credit_notes.map(|notes| CreditDetails {
            due_date: None,
            notes: Some(notes),
        });

        let input = CreateBill {
            job_id: self.job_id,
            vehicle_no: self.vehicle_no,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            descriptions: self.descriptions,
            total_amount: self.total_amount,
            commission: self.commission,
            payment_type: self.payment_type,
            initial_payment: self.initial_payment,
            cheque_details,
            credit_details,
            bank_account_id: self.bank_account_id,
            created_by: self.created_by,
        };
        (input, self.additional_services)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBillResponse {
    pub bill_id: Uuid,
    pub is_existing: bool,
    pub warnings: Vec<String>,
}

impl From<BillCreation> for CreateBillResponse {
    fn from(c: BillCreation) -> Self {
        Self {
            bill_id: c.bill_id,
            is_existing: c.is_existing,
            warnings: c.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusHistoryResponse {
    pub status: BillStatus,
    pub at: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ChequeDetailsResponse {
    pub cheque_no: String,
    pub bank_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub vehicle_no: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub descriptions: Vec<String>,
    pub total_amount: f64,
    pub commission: f64,
    pub final_amount: f64,
    pub payment_type: PaymentType,
    pub status: BillStatus,
    pub initial_payment: f64,
    pub remaining_balance: f64,
    pub cheque_details: Option<ChequeDetailsResponse>,
    pub credit_notes: Option<String>,
    pub bank_account_id: Option<Uuid>,
    pub version: i64,
    pub status_history: Vec<StatusHistoryResponse>,
    pub last_payment_date: Option<String>,
    pub is_paid_in_full: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id,
            job_id: bill.job_id,
            vehicle_no: bill.vehicle_no,
            customer_name: bill.customer_name,
            customer_phone: bill.customer_phone,
            descriptions: bill.descriptions,
            total_amount: bill.total_amount,
            commission: bill.commission,
            final_amount: bill.final_amount,
            payment_type: bill.payment_type,
            status: bill.status,
            initial_payment: bill.initial_payment,
            remaining_balance: bill.remaining_balance.unwrap_or(bill.final_amount),
            cheque_details: bill.cheque_details.map(|d| ChequeDetailsResponse {
                cheque_no: d.cheque_no,
                bank_name: d.bank_name,
            }),
            credit_notes: bill.credit_details.and_then(|d| d.notes),
            bank_account_id: bill.bank_account_id,
            version: bill.version,
            status_history: bill
                .status_history
                .into_iter()
                .map(|e| StatusHistoryResponse {
                    status: e.status,
                    at: fmt_datetime(e.at),
                    reason: e.reason,
                })
                .collect(),
            last_payment_date: bill.last_payment_date.map(fmt_datetime),
            is_paid_in_full: bill.is_paid_in_full,
            created_at: fmt_datetime(bill.created_at),
            updated_at: fmt_datetime(bill.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: f64,
    pub method: PaymentMethod,
    pub cheque_no: Option<String>,
    /// RFC 3339; defaults to now when omitted.
    pub paid_at: Option<String>,
    pub processed_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment_id: Uuid,
    pub payment_amount: f64,
    pub new_remaining_balance: f64,
    pub is_paid_in_full: bool,
    pub snapshot_id: Option<Uuid>,
    pub warnings: Vec<String>,
}

impl From<PaymentOutcome> for RecordPaymentResponse {
    fn from(o: PaymentOutcome) -> Self {
        Self {
            payment_id: o.payment_id,
            payment_amount: o.payment_amount,
            new_remaining_balance: o.new_remaining_balance,
            is_paid_in_full: o.is_paid_in_full,
            snapshot_id: o.snapshot_id,
            warnings: o.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
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
    pub paid_at: String,
}

impl From<CreditPayment> for PaymentResponse {
    fn from(p: CreditPayment) -> Self {
        Self {
            id: p.id,
            bill_id: p.bill_id,
            job_id: p.job_id,
            amount: p.amount,
            method: p.method,
            cheque_no: p.cheque_no,
            previous_balance: p.previous_balance,
            new_balance: p.new_balance,
            processed_by: p.processed_by,
            validation_status: p.validation_status,
            paid_at: fmt_datetime(p.paid_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub job_id: Uuid,
    pub vehicle_no: String,
    pub customer_name: String,
    pub final_amount: f64,
    pub remaining_balance: f64,
    pub status: BillStatus,
    pub payment_id: Uuid,
    pub payment_amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub method: PaymentMethod,
    pub paid_at: String,
    pub created_at: String,
}

impl From<BillSnapshot> for SnapshotResponse {
    fn from(s: BillSnapshot) -> Self {
        Self {
            id: s.id,
            bill_id: s.bill_id,
            job_id: s.job_id,
            vehicle_no: s.vehicle_no,
            customer_name: s.customer_name,
            final_amount: s.final_amount,
            remaining_balance: s.remaining_balance,
            status: s.status,
            payment_id: s.payment.payment_id,
            payment_amount: s.payment.amount,
            previous_balance: s.payment.previous_balance,
            new_balance: s.payment.new_balance,
            method: s.payment.method,
            paid_at: fmt_datetime(s.payment.paid_at),
            created_at: fmt_datetime(s.created_at),
        }
    }
}
