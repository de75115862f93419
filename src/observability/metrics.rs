//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dashboard_actions_total` (counter): action log entries by action, class
//! - `dashboard_request_latency_ms` (histogram): answered requests by source (`action`, `health`)
//! - `dashboard_target_health` (gauge): 1=up, 0=down, -1=unknown, per target
//! - `dashboard_failovers_total` (counter): failover notices by new role
//! - `dashboard_event_stream_reconnects_total` (counter)
//! - `dashboard_recovery_ms` (histogram): failure-cycle recovery time
//! - `dashboard_recovery_error_rate` (histogram): failing polls per cycle, percent
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::actions::Class;
use crate::routing::TargetRole;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_action(action: &str, class: Class) {
    ::metrics::counter!(
        "dashboard_actions_total",
        "action" => action.to_string(),
        "class" => class.as_str()
    )
    .increment(1);
}

pub fn record_request_latency(source: &'static str, latency: Duration) {
    ::metrics::histogram!("dashboard_request_latency_ms", "source" => source)
        .record(latency.as_secs_f64() * 1000.0);
}

/// `healthy = None` means the target's state is unknown.
pub fn record_target_health(role: TargetRole, healthy: Option<bool>) {
    let value = match healthy {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => -1.0,
    };
    ::metrics::gauge!("dashboard_target_health", "target" => role.to_string()).set(value);
}

pub fn record_failover(role: TargetRole) {
    ::metrics::counter!("dashboard_failovers_total", "target" => role.to_string()).increment(1);
}

pub fn record_reconnect() {
    ::metrics::counter!("dashboard_event_stream_reconnects_total").increment(1);
}

pub fn record_recovery(elapsed_ms: u64, error_rate_percent: f64) {
    ::metrics::histogram!("dashboard_recovery_ms").record(elapsed_ms as f64);
    ::metrics::histogram!("dashboard_recovery_error_rate").record(error_rate_percent);
}
