//! Bank account ledger: a running balance backed by an append-only
//! transaction log.
//!
//! When invoked as a post-commit side effect of a billing operation the
//! caller catches any failure here and folds it into its warnings; a
//! ledger hiccup never unwinds a committed bill or payment.

use bson::{doc, DateTime};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use uuid::Uuid;

use crate::models::{BankAccount, BankTransaction, CreateBankAccount, TransactionDirection};
use crate::services::error::ServiceError;
use crate::services::money;
use crate::services::repository::WorkshopRepository;

#[derive(Clone)]
pub struct BankService {
    repo: WorkshopRepository,
}

impl BankService {
    pub fn new(repo: WorkshopRepository) -> Self {
        Self { repo }
    }

    pub async fn create_account(
        &self,
        input: CreateBankAccount,
    ) -> Result<BankAccount, ServiceError> {
        let mut errors = Vec::new();
        if input.name.trim().is_empty() {
            errors.push("account name is required".to_string());
        }
        if input.account_number.trim().is_empty() {
            errors.push("account number is required".to_string());
        }
        if money::to_cents(input.opening_balance) < 0 {
            errors.push(format!(
                "opening balance cannot be negative (got {})",
                input.opening_balance
            ));
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let now = DateTime::now();
        let account = BankAccount {
            id: Uuid::new_v4(),
            name: input.name,
            account_number: input.account_number,
            bank_name: input.bank_name,
            balance: money::round2(input.opening_balance),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.repo.bank_accounts().insert_one(&account, None).await?;

        if money::to_cents(account.balance) > 0 {
            let opening = BankTransaction {
                id: Uuid::new_v4(),
                account_id: account.id,
                direction: TransactionDirection::Credit,
                amount: account.balance,
                balance_after: account.balance,
                description: "Opening balance".to_string(),
                bill_id: None,
                payment_id: None,
                recorded_by: None,
                created_at: now,
            };
            self.repo
                .bank_transactions()
                .insert_one(&opening, None)
                .await?;
        }

        tracing::info!(account_id = %account.id, name = %account.name, "Bank account created");
        Ok(account)
    }

    pub async fn find_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<BankAccount>, ServiceError> {
        let account = self
            .repo
            .bank_accounts()
            .find_one(doc! { "_id": account_id.to_string() }, None)
            .await?;
        Ok(account)
    }

    /// Adjust an account's running balance and append the backing ledger
    /// entry, atomically. The balance write is conditioned on the balance
    /// that was read, so concurrent adjusters cannot lose an update.
    pub async fn update_balance(
        &self,
        account_id: Uuid,
        amount: f64,
        direction: TransactionDirection,
        description: String,
        bill_id: Option<Uuid>,
        payment_id: Option<Uuid>,
        recorded_by: Option<String>,
    ) -> Result<BankTransaction, ServiceError> {
        let amount_cents = money::to_cents(amount);
        if amount_cents <= 0 {
            return Err(ServiceError::Validation(vec![format!(
                "adjustment amount must be positive (got {amount})"
            )]));
        }

        let mut session = self.repo.client().start_session(None).await?;
        session.start_transaction(None).await?;

        let txn_result: Result<BankTransaction, ServiceError> = async {
            let account = self
                .repo
                .bank_accounts()
                .find_one_with_session(doc! { "_id": account_id.to_string() }, None, &mut session)
                .await?
                .ok_or(ServiceError::AccountNotFound(account_id))?;

            let balance_cents = money::to_cents(account.balance);
            let new_balance_cents = match direction {
                TransactionDirection::Credit => balance_cents + amount_cents,
                TransactionDirection::Debit => {
                    if amount_cents > balance_cents {
                        return Err(ServiceError::InsufficientFunds {
                            balance: account.balance,
                            amount: money::from_cents(amount_cents),
                        });
                    }
                    balance_cents - amount_cents
                }
            };
            let new_balance = money::from_cents(new_balance_cents);

            let result = self
                .repo
                .bank_accounts()
                .update_one_with_session(
                    doc! { "_id": account_id.to_string(), "balance": account.balance },
                    doc! { "$set": { "balance": new_balance, "updated_at": DateTime::now() } },
                    None,
                    &mut session,
                )
                .await?;
            if result.matched_count == 0 {
                return Err(ServiceError::ConcurrentModification);
            }

            let transaction = BankTransaction {
                id: Uuid::new_v4(),
                account_id,
                direction,
                amount: money::from_cents(amount_cents),
                balance_after: new_balance,
                description,
                bill_id,
                payment_id,
                recorded_by,
                created_at: DateTime::now(),
            };
            self.repo
                .bank_transactions()
                .insert_one_with_session(&transaction, None, &mut session)
                .await?;

            Ok(transaction)
        }
        .await;

        let transaction = match txn_result {
            Ok(t) => t,
            Err(err) => {
                session.abort_transaction().await.ok();
                return Err(err);
            }
        };
        session.commit_transaction().await?;

        tracing::info!(
            account_id = %account_id,
            direction = direction.as_str(),
            amount = transaction.amount,
            balance_after = transaction.balance_after,
            "Bank account balance updated"
        );
        Ok(transaction)
    }

    pub async fn list_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<BankTransaction>, ServiceError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .repo
            .bank_transactions()
            .find(doc! { "account_id": account_id.to_string() }, Some(options))
            .await?;
        let transactions = cursor.try_collect().await?;
        Ok(transactions)
    }
}
