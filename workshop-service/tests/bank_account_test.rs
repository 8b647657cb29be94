mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn opening_balance_seeds_the_ledger() {
    let app = TestApp::spawn().await;

    let account_id = app.create_bank_account(5000.0).await;
    let account = app.get_json(&format!("/bank-accounts/{}", account_id)).await;
    assert_eq!(account["balance"], 5000.0);

    let transactions = app
        .get_json(&format!("/bank-accounts/{}/transactions", account_id))
        .await;
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["description"], "Opening balance");
    assert_eq!(transactions[0]["balance_after"], 5000.0);

    app.cleanup().await;
}

#[tokio::test]
async fn credit_and_debit_adjust_the_running_balance() {
    let app = TestApp::spawn().await;
    let account_id = app.create_bank_account(1000.0).await;

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", account_id),
            &json!({
                "amount": 250.50,
                "direction": "credit",
                "description": "cheque deposit",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let transaction: serde_json::Value = response.json().await.unwrap();
    assert_eq!(transaction["balance_after"], 1250.5);

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", account_id),
            &json!({
                "amount": 50.50,
                "direction": "debit",
                "description": "parts supplier payment",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let transaction: serde_json::Value = response.json().await.unwrap();
    assert_eq!(transaction["balance_after"], 1200.0);

    let account = app.get_json(&format!("/bank-accounts/{}", account_id)).await;
    assert_eq!(account["balance"], 1200.0);

    app.cleanup().await;
}

#[tokio::test]
async fn debit_below_zero_is_rejected() {
    let app = TestApp::spawn().await;
    let account_id = app.create_bank_account(100.0).await;

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", account_id),
            &json!({
                "amount": 100.01,
                "direction": "debit",
                "description": "overdraw attempt",
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let account = app.get_json(&format!("/bank-accounts/{}", account_id)).await;
    assert_eq!(account["balance"], 100.0);

    app.cleanup().await;
}

#[tokio::test]
async fn non_positive_adjustments_are_rejected() {
    let app = TestApp::spawn().await;
    let account_id = app.create_bank_account(100.0).await;

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", account_id),
            &json!({
                "amount": 0.0,
                "direction": "credit",
                "description": "noop",
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn adjusting_an_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", uuid::Uuid::new_v4()),
            &json!({
                "amount": 10.0,
                "direction": "credit",
                "description": "ghost",
            }),
        )
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn transactions_carry_back_references() {
    let app = TestApp::spawn().await;
    let account_id = app.create_bank_account(0.0).await;
    let bill_ref = uuid::Uuid::new_v4().to_string();

    let response = app
        .post_json(
            &format!("/bank-accounts/{}/adjust", account_id),
            &json!({
                "amount": 750.0,
                "direction": "credit",
                "description": "bill settlement",
                "bill_id": bill_ref,
                "recorded_by": "owner",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let transaction: serde_json::Value = response.json().await.unwrap();
    assert_eq!(transaction["bill_id"].as_str().unwrap(), bill_ref);
    assert_eq!(transaction["recorded_by"], "owner");

    app.cleanup().await;
}
