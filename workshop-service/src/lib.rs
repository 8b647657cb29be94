pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{ApprovalService, BankService, BillingService, WorkshopRepository};

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: WorkshopRepository,
    pub billing: BillingService,
    pub approvals: ApprovalService,
    pub bank: BankService,
}

/// Application container owning the listener lifecycle. The database
/// client is constructed here and injected through `AppState`; nothing
/// holds ambient connection state.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: mongodb::Database,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let repository = WorkshopRepository::new(client, &db);
        repository.init_indexes().await?;

        let bank = BankService::new(repository.clone());
        let billing = BillingService::new(repository.clone(), bank.clone());
        let approvals = ApprovalService::new(repository.clone());

        let state = AppState {
            db: db.clone(),
            config: config.clone(),
            repository,
            billing,
            approvals,
            bank,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            // Job board
            .route(
                "/jobs",
                post(handlers::jobs::create_job).get(handlers::jobs::get_board),
            )
            .route(
                "/jobs/:id",
                get(handlers::jobs::get_job).delete(handlers::jobs::delete_job),
            )
            .route("/jobs/:id/status", patch(handlers::jobs::update_status))
            .route("/jobs/:id/customer", patch(handlers::jobs::update_customer))
            .route("/jobs/:id/subtasks", post(handlers::jobs::add_subtask))
            .route(
                "/jobs/:id/subtasks/:subtask_id",
                delete(handlers::jobs::remove_subtask),
            )
            // Billing
            .route("/bills", post(handlers::bills::create_bill))
            .route("/bills/draft", post(handlers::bills::create_draft_bill))
            .route("/bills/:id", get(handlers::bills::get_bill))
            .route("/bills/:id/finalize", post(handlers::bills::finalize_bill))
            .route("/bills/:id/snapshots", get(handlers::bills::get_snapshots))
            // Credit payments
            .route(
                "/bills/:id/payments",
                post(handlers::payments::record_payment).get(handlers::payments::payment_history),
            )
            // Approval workflow
            .route(
                "/approvals",
                post(handlers::approvals::create_request).get(handlers::approvals::list_requests),
            )
            .route(
                "/approvals/:id/decision",
                post(handlers::approvals::decide_request),
            )
            // Bank ledger
            .route(
                "/bank-accounts",
                post(handlers::bank_accounts::create_account),
            )
            .route(
                "/bank-accounts/:id",
                get(handlers::bank_accounts::get_account),
            )
            .route(
                "/bank-accounts/:id/adjust",
                post(handlers::bank_accounts::adjust_balance),
            )
            .route(
                "/bank-accounts/:id/transactions",
                get(handlers::bank_accounts::list_transactions),
            )
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        // Port 0 binds a random free port, used by the test harness.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &mongodb::Database {
        &self.db
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
