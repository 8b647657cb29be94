use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        AdjustBalanceRequest, BankAccountResponse, BankTransactionResponse,
        CreateBankAccountRequest,
    },
    models::CreateBankAccount,
    utils::validation::ValidatedJson,
    AppState,
};

pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBankAccountRequest>,
) -> Result<(StatusCode, Json<BankAccountResponse>), AppError> {
    let account = state
        .bank
        .create_account(CreateBankAccount {
            name: payload.name,
            account_number: payload.account_number,
            bank_name: payload.bank_name,
            opening_balance: payload.opening_balance,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(BankAccountResponse::from(account))))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<BankAccountResponse>, AppError> {
    let account = state
        .bank
        .find_account(account_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Bank account {} not found", account_id))
        })?;
    Ok(Json(BankAccountResponse::from(account)))
}

pub async fn adjust_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdjustBalanceRequest>,
) -> Result<(StatusCode, Json<BankTransactionResponse>), AppError> {
    tracing::info!(
        account_id = %account_id,
        direction = payload.direction.as_str(),
        amount = payload.amount,
        "Adjusting bank account balance"
    );

    let transaction = state
        .bank
        .update_balance(
            account_id,
            payload.amount,
            payload.direction,
            payload.description,
            payload.bill_id,
            payload.payment_id,
            payload.recorded_by,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(BankTransactionResponse::from(transaction)),
    ))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<BankTransactionResponse>>, AppError> {
    let transactions = state.bank.list_transactions(account_id).await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(BankTransactionResponse::from)
            .collect(),
    ))
}
