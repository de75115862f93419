//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs (http(s) for the API, ws(s) for the notification stream)
//! - Validate value ranges (durations > 0, capacity > 0, rate bounds)
//! - Detect overlapping target markers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DashboardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::DashboardConfig;

/// Highest accepted auto-ping rate, in requests per second.
pub const MAX_AUTO_PING_RATE: f64 = 10.0;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: at least one value is required")]
    Empty { field: &'static str },

    #[error("{field}: '{value}' is not a valid {expected} URL")]
    InvalidUrl {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: {value} is outside (0, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("failure_cycle: max_attempts and max_duration_ms cannot both be disabled")]
    UnboundedRecovery,

    #[error("targets: marker '{0}' identifies both primary and spare")]
    AmbiguousMarker(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.base_urls.is_empty() {
        errors.push(ValidationError::Empty { field: "api.base_urls" });
    }
    for base in &config.api.base_urls {
        check_url(&mut errors, "api.base_urls", base, &["http", "https"], "http(s)");
    }
    check_url(
        &mut errors,
        "api.event_stream_url",
        &config.api.event_stream_url,
        &["ws", "wss"],
        "ws(s)",
    );

    let durations = [
        ("timeouts.request_ms", config.timeouts.request_ms),
        ("health_check.interval_ms", config.health_check.interval_ms),
        ("event_stream.reconnect_backoff_ms", config.event_stream.reconnect_backoff_ms),
        ("failure_cycle.poll_delay_ms", config.failure_cycle.poll_delay_ms),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if config.action_log.capacity == 0 {
        errors.push(ValidationError::Zero { field: "action_log.capacity" });
    }

    let rate = config.auto_ping.rate_per_sec;
    if !(rate > 0.0 && rate <= MAX_AUTO_PING_RATE) {
        errors.push(ValidationError::OutOfRange {
            field: "auto_ping.rate_per_sec",
            value: rate,
            max: MAX_AUTO_PING_RATE,
        });
    }

    if config.failure_cycle.attempt_guard().is_none() && config.failure_cycle.duration_guard().is_none() {
        errors.push(ValidationError::UnboundedRecovery);
    }

    let targets = &config.targets;
    if targets.primary_markers.is_empty() {
        errors.push(ValidationError::Empty { field: "targets.primary_markers" });
    }
    if targets.spare_markers.is_empty() {
        errors.push(ValidationError::Empty { field: "targets.spare_markers" });
    }
    // Roles are matched case-insensitively, so "Primary" and "primary" collide.
    for marker in &targets.primary_markers {
        let lowered = marker.to_lowercase();
        if targets.spare_markers.iter().any(|m| m.to_lowercase() == lowered) {
            errors.push(ValidationError::AmbiguousMarker(marker.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    schemes: &[&str],
    expected: &'static str,
) {
    let valid = Url::parse(value)
        .map(|u| schemes.contains(&u.scheme()) && u.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            expected,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DashboardConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = DashboardConfig::default();
        config.api.base_urls = vec!["ftp://proxy".to_string()];
        config.api.event_stream_url = "http://proxy/log".to_string();
        config.timeouts.request_ms = 0;
        config.action_log.capacity = 0;
        config.auto_ping.rate_per_sec = 25.0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::Zero { field: "timeouts.request_ms" }));
    }

    #[test]
    fn test_recovery_needs_a_guard() {
        let mut config = DashboardConfig::default();
        config.failure_cycle.max_attempts = 0;
        assert!(validate_config(&config).is_ok());

        config.failure_cycle.max_duration_ms = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::UnboundedRecovery])
        );
    }

    #[test]
    fn test_overlapping_markers_rejected() {
        let mut config = DashboardConfig::default();
        config.targets.spare_markers.push("8022".to_string());
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::AmbiguousMarker("8022".to_string())])
        );
    }

    #[test]
    fn test_overlapping_markers_differing_in_case_rejected() {
        let mut config = DashboardConfig::default();
        config.targets.spare_markers.push("PRIMARY".to_string());
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::AmbiguousMarker("primary".to_string())])
        );
    }
}
