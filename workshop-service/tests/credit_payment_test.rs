mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn partial_then_full_payment_walks_the_status_machine() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0001").await;
    let bill_id = app.create_credit_bill(&job_id, 1000.0, 400.0, None).await;

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["final_amount"], 1000.0);
    assert_eq!(bill["remaining_balance"], 600.0);
    assert_eq!(bill["status"], "finalized");

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 200.0, "method": "cash", "processed_by": "ravi" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["new_remaining_balance"], 400.0);
    assert_eq!(outcome["is_paid_in_full"], false);

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 400.0, "method": "upi", "processed_by": "ravi" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["new_remaining_balance"], 0.0);
    assert_eq!(outcome["is_paid_in_full"], true);

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["status"], "paid");
    assert_eq!(bill["is_paid_in_full"], true);
    assert_eq!(bill["remaining_balance"], 0.0);

    app.cleanup().await;
}

#[tokio::test]
async fn overpayment_is_rejected_and_bill_untouched() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0002").await;
    let bill_id = app.create_credit_bill(&job_id, 100.0, 0.0, None).await;

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 100.01, "method": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("cannot exceed remaining balance"));

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["remaining_balance"], 100.0);
    assert_eq!(bill["status"], "finalized");
    assert_eq!(bill["version"], 0);

    app.cleanup().await;
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0003").await;
    let bill_id = app.create_credit_bill(&job_id, 100.0, 0.0, None).await;

    for amount in [0.0, -5.0] {
        let response = app
            .post_json(
                &format!("/bills/{}/payments", bill_id),
                &json!({ "amount": amount, "method": "cash" }),
            )
            .await;
        assert_eq!(response.status(), 400);
    }

    app.cleanup().await;
}

#[tokio::test]
async fn cash_bills_do_not_accept_payments() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0004").await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-20-0004",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 250.0,
                "payment_type": "cash",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    let bill_id = created["bill_id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 50.0, "method": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn draft_bills_do_not_accept_payments() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0005").await;

    let response = app
        .post_json(
            "/bills/draft",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-20-0005",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 250.0,
                "payment_type": "credit",
            }),
        )
        .await;
    let created: serde_json::Value = response.json().await.unwrap();
    let bill_id = created["bill_id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 50.0, "method": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("draft"));

    app.cleanup().await;
}

#[tokio::test]
async fn paid_bill_rejects_further_payments() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0006").await;
    let bill_id = app.create_credit_bill(&job_id, 100.0, 0.0, None).await;

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 100.0, "method": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 1.0, "method": "cash" }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("paid in full"));

    app.cleanup().await;
}

#[tokio::test]
async fn payment_history_is_ordered_and_carries_balances() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0007").await;
    let bill_id = app.create_credit_bill(&job_id, 300.0, 0.0, None).await;

    for (amount, paid_at) in [
        (100.0, "2026-01-01T10:00:00Z"),
        (50.0, "2026-01-02T10:00:00Z"),
    ] {
        let response = app
            .post_json(
                &format!("/bills/{}/payments", bill_id),
                &json!({ "amount": amount, "method": "upi", "paid_at": paid_at }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    let history = app.get_json(&format!("/bills/{}/payments", bill_id)).await;
    let payments = history.as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["amount"], 100.0);
    assert_eq!(payments[0]["previous_balance"], 300.0);
    assert_eq!(payments[0]["new_balance"], 200.0);
    assert_eq!(payments[1]["amount"], 50.0);
    assert_eq!(payments[1]["previous_balance"], 200.0);
    assert_eq!(payments[1]["new_balance"], 150.0);

    app.cleanup().await;
}

#[tokio::test]
async fn each_payment_generates_an_immutable_snapshot() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-20-0008").await;
    let bill_id = app.create_credit_bill(&job_id, 500.0, 0.0, None).await;

    let response = app
        .post_json(
            &format!("/bills/{}/payments", bill_id),
            &json!({ "amount": 200.0, "method": "upi" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert!(outcome["snapshot_id"].is_string());
    assert_eq!(outcome["warnings"].as_array().unwrap().len(), 0);

    let snapshots = app.get_json(&format!("/bills/{}/snapshots", bill_id)).await;
    let snapshots = snapshots.as_array().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["remaining_balance"], 300.0);
    assert_eq!(snapshots[0]["payment_amount"], 200.0);
    assert_eq!(snapshots[0]["status"], "partially_paid");

    app.cleanup().await;
}
