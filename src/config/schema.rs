//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the failover dashboard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// Where the proxied API and its notification stream live.
    pub api: ApiConfig,

    /// Timeout configuration for outbound requests.
    pub timeouts: TimeoutConfig,

    /// Health polling settings.
    pub health_check: HealthCheckConfig,

    /// Notification stream settings.
    pub event_stream: EventStreamConfig,

    /// Failure-injection verification settings.
    pub failure_cycle: FailureCycleConfig,

    /// Action log settings.
    pub action_log: ActionLogConfig,

    /// Automatic data requests.
    pub auto_ping: AutoPingConfig,

    /// Substrings used to tell primary from spare.
    pub targets: TargetConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Endpoints of the proxied API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Candidate base URLs, probed in order during discovery.
    pub base_urls: Vec<String>,

    /// WebSocket URL of the router notification stream.
    pub event_stream_url: String,

    /// Path of the data endpoint (e.g. "/api/data" or "/data").
    pub data_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_urls: vec!["http://localhost:8021".to_string()],
            event_stream_url: "ws://localhost:8021/log".to_string(),
            data_path: "/api/data".to_string(),
        }
    }
}

/// Timeout configuration for outbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Hard deadline for a single request in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 2500 }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Health poll period in milliseconds.
    pub interval_ms: u64,

    /// Path to probe.
    pub path: String,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            path: "/health".to_string(),
        }
    }
}

/// Notification stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventStreamConfig {
    /// Fixed delay before reconnecting after the stream closes.
    pub reconnect_backoff_ms: u64,
}

impl EventStreamConfig {
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

impl Default for EventStreamConfig {
    fn default() -> Self {
        Self {
            reconnect_backoff_ms: 1500,
        }
    }
}

/// Failure-injection verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailureCycleConfig {
    /// Path that triggers fault injection.
    pub fail_path: String,

    /// Delay between recovery polls in milliseconds.
    pub poll_delay_ms: u64,

    /// Give up after this many polls. Zero disables the attempt guard.
    pub max_attempts: u32,

    /// Give up after this many milliseconds. Zero disables the duration guard.
    pub max_duration_ms: u64,
}

impl FailureCycleConfig {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn attempt_guard(&self) -> Option<u32> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }

    pub fn duration_guard(&self) -> Option<Duration> {
        (self.max_duration_ms > 0).then(|| Duration::from_millis(self.max_duration_ms))
    }
}

impl Default for FailureCycleConfig {
    fn default() -> Self {
        Self {
            fail_path: "/fail".to_string(),
            poll_delay_ms: 100,
            max_attempts: 300,
            max_duration_ms: 60_000,
        }
    }
}

/// Action log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionLogConfig {
    /// Maximum number of retained entries.
    pub capacity: usize,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self { capacity: 600 }
    }
}

/// Auto-ping configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoPingConfig {
    /// Start auto-ping at boot.
    pub enabled: bool,

    /// Requests per second.
    pub rate_per_sec: f64,
}

impl Default for AutoPingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_per_sec: 1.0,
        }
    }
}

/// Substring markers that identify a target from its URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub primary_markers: Vec<String>,
    pub spare_markers: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            primary_markers: vec!["primary".to_string(), "8022".to_string()],
            spare_markers: vec![
                "spare".to_string(),
                "backup".to_string(),
                "8023".to_string(),
            ],
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8090".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(config.timeouts.request_ms, 2500);
        assert_eq!(config.health_check.interval_ms, 2000);
        assert_eq!(config.event_stream.reconnect_backoff_ms, 1500);
        assert_eq!(config.failure_cycle.poll_delay_ms, 100);
        assert_eq!(config.failure_cycle.attempt_guard(), Some(300));
        assert_eq!(config.action_log.capacity, 600);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [failure_cycle]
            poll_delay_ms = 50

            [api]
            base_urls = ["http://proxy:8021"]
            "#,
        )
        .unwrap();
        assert_eq!(config.failure_cycle.poll_delay_ms, 50);
        assert_eq!(config.failure_cycle.max_duration_ms, 60_000);
        assert_eq!(config.api.base_urls, vec!["http://proxy:8021".to_string()]);
        assert_eq!(config.api.data_path, "/api/data");
    }
}
