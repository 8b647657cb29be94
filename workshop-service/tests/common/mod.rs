use secrecy::Secret;
use serde_json::{json, Value};
use workshop_service::config::{Config, DatabaseConfig, LogConfig, ServerConfig};
use workshop_service::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: mongodb::Database,
    pub db_name: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("workshop_test_{}", uuid::Uuid::new_v4().simple());

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new(
                    std::env::var("TEST_MONGODB_URI")
                        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                ),
                db_name: db_name.clone(),
            },
            log: LogConfig { json: false },
            service_name: "workshop-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept requests.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            client,
        }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Response was not valid JSON")
    }

    /// Create a job and return its id.
    pub async fn create_job(&self, vehicle_no: &str) -> String {
        let response = self
            .post_json(
                "/jobs",
                &json!({
                    "vehicle_no": vehicle_no,
                    "customer_name": "Asha Rao",
                    "customer_phone": "9876543210",
                    "damage_remarks": "front bumper scratch",
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "job creation failed");
        let body: Value = response.json().await.expect("invalid job response");
        body["id"].as_str().expect("job id missing").to_string()
    }

    /// Create a finalized credit bill for a job and return its id.
    pub async fn create_credit_bill(
        &self,
        job_id: &str,
        total_amount: f64,
        initial_payment: f64,
        bank_account_id: Option<&str>,
    ) -> String {
        let mut body = json!({
            "job_id": job_id,
            "vehicle_no": "KA-01-1234",
            "customer_name": "Asha Rao",
            "customer_phone": "9876543210",
            "descriptions": ["general service"],
            "total_amount": total_amount,
            "commission": 0.0,
            "payment_type": "credit",
            "initial_payment": initial_payment,
        });
        if let Some(account_id) = bank_account_id {
            body["bank_account_id"] = json!(account_id);
        }

        let response = self.post_json("/bills", &body).await;
        assert_eq!(response.status(), 201, "bill creation failed");
        let body: Value = response.json().await.expect("invalid bill response");
        assert_eq!(body["is_existing"], false);
        body["bill_id"].as_str().expect("bill id missing").to_string()
    }

    /// Create a bank account and return its id.
    pub async fn create_bank_account(&self, opening_balance: f64) -> String {
        let response = self
            .post_json(
                "/bank-accounts",
                &json!({
                    "name": "Workshop current account",
                    "account_number": "00112233445566",
                    "bank_name": "State Bank",
                    "opening_balance": opening_balance,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "bank account creation failed");
        let body: Value = response.json().await.expect("invalid account response");
        body["id"].as_str().expect("account id missing").to_string()
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        self.db
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}
