//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatcher metrics (requests, latency, startup counts)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by outcome, status
//! - `dispatch_request_duration_seconds` (histogram): latency distribution
//! - `container_beans` (gauge): distinct beans after startup
//! - `routing_routes` (gauge): mapped routes after startup
//! - `startup_issues` (gauge): advisory issues recorded during startup
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for outcome and status code only; URLs are unbounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::lifecycle::report::StartupReport;

/// Installs the global recorder and serves `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Records one dispatched request.
pub fn record_dispatch(outcome: &'static str, status: u16, started: Instant) {
    metrics::counter!(
        "dispatch_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("dispatch_request_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Publishes the startup counts.
pub fn record_startup(report: &StartupReport) {
    metrics::gauge!("container_beans").set(report.beans as f64);
    metrics::gauge!("routing_routes").set(report.routes as f64);
    metrics::gauge!("startup_issues").set(report.issues.len() as f64);
}
