use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static BILLS_CREATED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PAYMENTS_RECORDED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PAYMENT_AMOUNT_CENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static APPROVAL_DECISIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    if METRICS_HANDLE.set(handle).is_err() {
        return;
    }

    let registry = Registry::new();

    let bills_counter = IntCounterVec::new(
        Opts::new("bills_created_total", "Bills created by initial status"),
        &["status"],
    )
    .expect("Failed to create bills_created_total metric");

    let payments_counter = IntCounterVec::new(
        Opts::new(
            "credit_payments_recorded_total",
            "Credit payments recorded by method",
        ),
        &["method"],
    )
    .expect("Failed to create credit_payments_recorded_total metric");

    let amount_counter = IntCounterVec::new(
        Opts::new(
            "credit_payment_amount_cents_total",
            "Total credit payment amounts by method (in cents)",
        ),
        &["method"],
    )
    .expect("Failed to create credit_payment_amount_cents_total metric");

    let approvals_counter = IntCounterVec::new(
        Opts::new(
            "approval_decisions_total",
            "Approval request decisions by outcome",
        ),
        &["decision"],
    )
    .expect("Failed to create approval_decisions_total metric");

    registry
        .register(Box::new(bills_counter.clone()))
        .expect("Failed to register bills_created_total");
    registry
        .register(Box::new(payments_counter.clone()))
        .expect("Failed to register credit_payments_recorded_total");
    registry
        .register(Box::new(amount_counter.clone()))
        .expect("Failed to register credit_payment_amount_cents_total");
    registry
        .register(Box::new(approvals_counter.clone()))
        .expect("Failed to register approval_decisions_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("Failed to set prometheus registry");
    BILLS_CREATED_TOTAL
        .set(bills_counter)
        .expect("Failed to set bills_created_total");
    PAYMENTS_RECORDED_TOTAL
        .set(payments_counter)
        .expect("Failed to set credit_payments_recorded_total");
    PAYMENT_AMOUNT_CENTS_TOTAL
        .set(amount_counter)
        .expect("Failed to set credit_payment_amount_cents_total");
    APPROVAL_DECISIONS_TOTAL
        .set(approvals_counter)
        .expect("Failed to set approval_decisions_total");
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

pub fn record_bill_created(status: &str) {
    if let Some(counter) = BILLS_CREATED_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

pub fn record_payment(method: &str, amount_cents: u64) {
    if let Some(counter) = PAYMENTS_RECORDED_TOTAL.get() {
        counter.with_label_values(&[method]).inc();
    }
    if let Some(counter) = PAYMENT_AMOUNT_CENTS_TOTAL.get() {
        counter.with_label_values(&[method]).inc_by(amount_cents);
    }
}

pub fn record_approval_decision(decision: &str) {
    if let Some(counter) = APPROVAL_DECISIONS_TOTAL.get() {
        counter.with_label_values(&[decision]).inc();
    }
}
