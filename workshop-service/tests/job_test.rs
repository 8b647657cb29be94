mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_job_and_fetch_it() {
    let app = TestApp::spawn().await;

    let job_id = app.create_job("KA-01-1234").await;
    let job = app.get_json(&format!("/jobs/{}", job_id)).await;

    assert_eq!(job["vehicle_no"], "KA-01-1234");
    assert_eq!(job["status"], "todo");
    assert_eq!(job["customer_name"], "Asha Rao");

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_active_vehicle_is_rejected() {
    let app = TestApp::spawn().await;

    app.create_job("KA-02-9999").await;
    let response = app
        .post_json("/jobs", &json!({ "vehicle_no": "KA-02-9999" }))
        .await;
    assert_eq!(response.status(), 409);

    app.cleanup().await;
}

#[tokio::test]
async fn delivered_vehicle_can_get_a_new_job() {
    let app = TestApp::spawn().await;

    let job_id = app.create_job("KA-03-1111").await;
    let response = app
        .client
        .patch(format!("{}/jobs/{}/status", app.address, job_id))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // The first job is delivered, so the same vehicle may come back.
    app.create_job("KA-03-1111").await;

    app.cleanup().await;
}

#[tokio::test]
async fn missing_vehicle_number_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/jobs", &json!({ "vehicle_no": "" })).await;
    assert_eq!(response.status(), 422);

    app.cleanup().await;
}

#[tokio::test]
async fn board_groups_jobs_by_status() {
    let app = TestApp::spawn().await;

    let first = app.create_job("KA-04-0001").await;
    app.create_job("KA-04-0002").await;

    let response = app
        .client
        .patch(format!("{}/jobs/{}/status", app.address, first))
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let board = app.get_json("/jobs").await;
    assert_eq!(board["todo"].as_array().unwrap().len(), 1);
    assert_eq!(board["in_progress"].as_array().unwrap().len(), 1);
    assert_eq!(board["finished"].as_array().unwrap().len(), 0);

    app.cleanup().await;
}

#[tokio::test]
async fn updating_status_of_unknown_job_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .patch(format!(
            "{}/jobs/{}/status",
            app.address,
            uuid::Uuid::new_v4()
        ))
        .json(&json!({ "status": "finished" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn subtasks_can_be_added_and_removed() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-05-5555").await;

    let response = app
        .post_json(
            &format!("/jobs/{}/subtasks", job_id),
            &json!({ "kind": "parts", "part_name": "Brake pad", "brand": "Bosch" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let subtask: serde_json::Value = response.json().await.unwrap();
    let subtask_id = subtask["id"].as_str().unwrap();

    let job = app.get_json(&format!("/jobs/{}", job_id)).await;
    assert_eq!(job["subtasks"].as_array().unwrap().len(), 1);

    let response = app
        .client
        .delete(format!(
            "{}/jobs/{}/subtasks/{}",
            app.address, job_id, subtask_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let job = app.get_json(&format!("/jobs/{}", job_id)).await;
    assert_eq!(job["subtasks"].as_array().unwrap().len(), 0);

    app.cleanup().await;
}

#[tokio::test]
async fn parts_subtask_requires_a_part_name() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-06-6666").await;

    let response = app
        .post_json(
            &format!("/jobs/{}/subtasks", job_id),
            &json!({ "kind": "parts" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn soft_deleted_job_disappears_from_reads() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-07-7777").await;

    let response = app
        .client
        .delete(format!("{}/jobs/{}", app.address, job_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = app
        .client
        .get(format!("{}/jobs/{}", app.address, job_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Soft delete keeps the document around.
    let count = app
        .db
        .collection::<mongodb::bson::Document>("jobs")
        .count_documents(None, None)
        .await
        .unwrap();
    assert_eq!(count, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn hard_delete_removes_the_document() {
    let app = TestApp::spawn().await;
    let job_id = app.create_job("KA-08-8888").await;

    let response = app
        .client
        .delete(format!("{}/jobs/{}?hard=true", app.address, job_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let count = app
        .db
        .collection::<mongodb::bson::Document>("jobs")
        .count_documents(None, None)
        .await
        .unwrap();
    assert_eq!(count, 0);

    app.cleanup().await;
}
