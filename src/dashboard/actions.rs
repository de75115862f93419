//! User-triggered requests and their log entries.

use std::time::Instant;

use crate::actions::{ActionEntry, ActionLog, ResultCode};
use crate::observability::metrics;
use crate::resilience::{Reply, RequestError, RequestExecutor};
use crate::routing::ActiveReader;

/// Issues one request through the executor and records exactly one entry for it.
#[derive(Debug, Clone)]
pub struct ActionRunner {
    executor: RequestExecutor,
    base: String,
    active: ActiveReader,
    log: ActionLog,
}

impl ActionRunner {
    pub fn new(executor: RequestExecutor, base: impl Into<String>, active: ActiveReader, log: ActionLog) -> Self {
        Self {
            executor,
            base: base.into(),
            active,
            log,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET {base}{path}`, labelled `GET <path>`.
    pub async fn get(&self, path: &str) -> ActionEntry {
        let started = Instant::now();
        let result = self.executor.get(&self.base, path).await;
        self.record(format!("GET {}", path), result, started)
    }

    /// `POST {base}{path}`, labelled `POST <path>`.
    pub async fn post(&self, path: &str) -> ActionEntry {
        let started = Instant::now();
        let result = self.executor.post(&self.base, path).await;
        self.record(format!("POST {}", path), result, started)
    }

    fn record(
        &self,
        action: String,
        result: Result<Reply, RequestError>,
        started: Instant,
    ) -> ActionEntry {
        let entry = match result {
            // X-Served-By beats the router-inferred target.
            Ok(reply) => {
                metrics::record_request_latency("action", reply.latency);
                ActionEntry::new(action, ResultCode::Status(reply.status))
                    .served_by(
                        reply
                            .served_by()
                            .map(str::to_string)
                            .unwrap_or_else(|| self.active.url()),
                    )
                    .latency(reply.latency)
            }
            Err(e) => {
                tracing::debug!(action = %action, error = %e, "Request failed");
                ActionEntry::failed(action, &e, started.elapsed())
            }
        };
        self.log.append(entry.clone());
        entry
    }
}
