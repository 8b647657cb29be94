mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_bill_computes_cents_precise_amounts() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0001").await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-10-0001",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 19.99,
                "commission": 0.01,
                "payment_type": "credit",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    let bill_id = created["bill_id"].as_str().unwrap();

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["total_amount"], 19.99);
    assert_eq!(bill["commission"], 0.01);
    assert_eq!(bill["final_amount"], 20.0);
    assert_eq!(bill["remaining_balance"], 20.0);
    assert_eq!(bill["status"], "finalized");
    assert_eq!(bill["version"], 0);
    assert_eq!(bill["status_history"].as_array().unwrap().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn create_bill_is_idempotent_per_job() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0002").await;

    let first = app.create_credit_bill(&job_id, 500.0, 0.0, None).await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-10-0002",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 500.0,
                "payment_type": "credit",
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_existing"], true);
    assert_eq!(body["bill_id"].as_str().unwrap(), first);

    let count = app
        .db
        .collection::<mongodb::bson::Document>("bills")
        .count_documents(None, None)
        .await
        .unwrap();
    assert_eq!(count, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn validation_failures_aggregate_and_write_nothing() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0003").await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "payment_type": "credit",
                "total_amount": 0.0,
            }),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("vehicle number"));
    assert!(message.contains("customer name"));
    assert!(message.contains("total amount"));

    let count = app
        .db
        .collection::<mongodb::bson::Document>("bills")
        .count_documents(None, None)
        .await
        .unwrap();
    assert_eq!(count, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn cheque_bill_requires_cheque_number() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0004").await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-10-0004",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 750.0,
                "payment_type": "cheque",
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn additional_services_land_on_the_job_as_completed_subtasks() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0005").await;

    let response = app
        .post_json(
            "/bills",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-10-0005",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 300.0,
                "payment_type": "cash",
                "additional_services": ["Wheel alignment", "Interior cleaning"],
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let job = app.get_json(&format!("/jobs/{}", job_id)).await;
    let subtasks = job["subtasks"].as_array().unwrap();
    assert_eq!(subtasks.len(), 2);
    assert!(subtasks.iter().all(|s| s["is_completed"] == true));

    app.cleanup().await;
}

#[tokio::test]
async fn draft_bill_finalizes_exactly_once() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0006").await;

    let response = app
        .post_json(
            "/bills/draft",
            &json!({
                "job_id": job_id,
                "vehicle_no": "KA-10-0006",
                "customer_name": "Asha Rao",
                "customer_phone": "9876543210",
                "total_amount": 450.0,
                "payment_type": "credit",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    let bill_id = created["bill_id"].as_str().unwrap().to_string();

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["status"], "draft");

    let response = app
        .post_json(&format!("/bills/{}/finalize", bill_id), &json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let bill: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bill["status"], "finalized");
    assert_eq!(bill["version"], 1);
    assert_eq!(bill["status_history"].as_array().unwrap().len(), 2);

    // A finalized bill is no longer a draft; finalizing again is illegal.
    let response = app
        .post_json(&format!("/bills/{}/finalize", bill_id), &json!({}))
        .await;
    assert_eq!(response.status(), 400);

    let bill = app.get_json(&format!("/bills/{}", bill_id)).await;
    assert_eq!(bill["status"], "finalized");

    app.cleanup().await;
}

#[tokio::test]
async fn bill_is_reachable_through_its_job_id() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-10-0007").await;
    let bill_id = app.create_credit_bill(&job_id, 800.0, 0.0, None).await;

    let bill = app.get_json(&format!("/bills/{}", job_id)).await;
    assert_eq!(bill["id"].as_str().unwrap(), bill_id);

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_bill_id_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/bills/{}", app.address, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}
