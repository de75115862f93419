//! API base discovery.

use serde::Serialize;

use crate::resilience::RequestExecutor;

/// The chosen API base and whether it answered the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub base: String,
    pub verified: bool,
}

/// Probe each candidate's health path in order and pick the first that answers 2xx.
///
/// Falls back to the last candidate when none answers. `None` only for an empty list.
pub async fn discover_endpoint(
    executor: &RequestExecutor,
    candidates: &[String],
    health_path: &str,
) -> Option<Discovery> {
    for base in candidates {
        match executor.get(base, health_path).await {
            Ok(reply) if reply.is_success() => {
                tracing::info!(base = %base, "API endpoint discovered");
                return Some(Discovery {
                    base: base.clone(),
                    verified: true,
                });
            }
            Ok(reply) => tracing::debug!(base = %base, status = reply.status, "Candidate not healthy"),
            Err(e) => tracing::debug!(base = %base, error = %e, "Candidate unreachable"),
        }
    }

    let fallback = candidates.last()?;
    tracing::warn!(base = %fallback, "No candidate answered, using fallback API base");
    Some(Discovery {
        base: fallback.clone(),
        verified: false,
    })
}
