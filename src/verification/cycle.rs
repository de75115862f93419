//! Trigger a fault on the active target and measure how long recovery takes.

use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

use crate::actions::{ActionEntry, ActionLog, ResultCode};
use crate::config::FailureCycleConfig;
use crate::observability::metrics;
use crate::resilience::{latency_ms, Reply, RequestError, RequestExecutor};
use crate::routing::ActiveReader;

/// Label of the summary entry appended at the end of a cycle.
pub const RECOVERY_ACTION: &str = "RECOVERY";

/// Summary of a completed verification cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub total_attempts: u32,
    pub failed_attempts: u32,
    /// From the first poll to the successful one, at least 1.
    pub elapsed_ms: u64,
    /// Failed polls over all polls, one decimal place.
    pub error_rate_percent: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CycleError {
    /// The fault-injection request itself got no response.
    #[error("fault injection failed: {0}")]
    Trigger(RequestError),

    /// The target did not recover before the attempt or duration guard.
    #[error("no recovery after {attempts} attempts ({elapsed_ms} ms)")]
    RecoveryTimeout { attempts: u32, elapsed_ms: u64 },
}

/// `fails / total * 100`, rounded to one decimal place.
pub fn error_rate_percent(fails: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = f64::from(fails) / f64::from(total) * 100.0;
    (rate * 10.0).round() / 10.0
}

pub struct FailureCycle {
    executor: RequestExecutor,
    base: String,
    health_path: String,
    config: FailureCycleConfig,
    active: ActiveReader,
    log: ActionLog,
}

impl FailureCycle {
    pub fn new(
        executor: RequestExecutor,
        base: impl Into<String>,
        health_path: impl Into<String>,
        config: FailureCycleConfig,
        active: ActiveReader,
        log: ActionLog,
    ) -> Self {
        Self {
            executor,
            base: base.into(),
            health_path: health_path.into(),
            config,
            active,
            log,
        }
    }

    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        self.trigger().await?;

        let mut total = 0u32;
        let mut fails = 0u32;
        let started = Instant::now();

        let last = loop {
            total += 1;

            match self.executor.get(&self.base, &self.health_path).await {
                Ok(reply) if reply.status == 200 => break reply,
                Ok(reply) => {
                    fails += 1;
                    tracing::debug!(attempt = total, status = reply.status, "Target still failing");
                }
                Err(e) => {
                    fails += 1;
                    tracing::debug!(attempt = total, error = %e, "Target unreachable");
                }
            }

            let elapsed = started.elapsed();
            if self.guard_tripped(total, elapsed) {
                return Err(self.give_up(total, fails, elapsed));
            }
            sleep(self.config.poll_delay()).await;
        };

        let elapsed_ms = latency_ms(started.elapsed());
        let report = CycleReport {
            total_attempts: total,
            failed_attempts: fails,
            elapsed_ms,
            error_rate_percent: error_rate_percent(fails, total),
        };

        tracing::info!(
            attempts = report.total_attempts,
            elapsed_ms = report.elapsed_ms,
            error_rate = report.error_rate_percent,
            "Target recovered"
        );
        metrics::record_recovery(report.elapsed_ms, report.error_rate_percent);
        self.log.append(
            ActionEntry::new(RECOVERY_ACTION, ResultCode::Status(last.status))
                .served_by(self.served_by(Some(&last)))
                .latency(Duration::from_millis(report.elapsed_ms))
                .detail(format!(
                    "recovered after {} attempts in {} ms, error rate {:.1}%",
                    report.total_attempts, report.elapsed_ms, report.error_rate_percent
                )),
        );

        Ok(report)
    }

    async fn trigger(&self) -> Result<(), CycleError> {
        let path = &self.config.fail_path;
        let action = format!("POST {}", path);
        let started = Instant::now();

        match self.executor.post(&self.base, path).await {
            Ok(reply) => {
                tracing::info!(status = reply.status, "Fault injected");
                self.log.append(
                    ActionEntry::new(action, ResultCode::Status(reply.status))
                        .served_by(self.served_by(Some(&reply)))
                        .latency(reply.latency),
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fault injection request failed, aborting cycle");
                self.log
                    .append(ActionEntry::failed(action, &e, started.elapsed()).served_by(self.served_by(None)));
                Err(CycleError::Trigger(e))
            }
        }
    }

    fn guard_tripped(&self, attempts: u32, elapsed: Duration) -> bool {
        let by_attempts = self.config.attempt_guard().is_some_and(|max| attempts >= max);
        let by_duration = self.config.duration_guard().is_some_and(|max| elapsed >= max);
        by_attempts || by_duration
    }

    fn give_up(&self, total: u32, fails: u32, elapsed: Duration) -> CycleError {
        let elapsed_ms = latency_ms(elapsed);
        let rate = error_rate_percent(fails, total);
        tracing::error!(attempts = total, elapsed_ms, "Target did not recover, giving up");
        self.log.append(
            ActionEntry::new(RECOVERY_ACTION, ResultCode::Err)
                .served_by(self.served_by(None))
                .latency(elapsed)
                .detail(format!(
                    "no recovery after {} attempts in {} ms, error rate {:.1}%",
                    total, elapsed_ms, rate
                )),
        );
        CycleError::RecoveryTimeout {
            attempts: total,
            elapsed_ms,
        }
    }

    fn served_by(&self, reply: Option<&Reply>) -> String {
        reply
            .and_then(Reply::served_by)
            .map(str::to_string)
            .unwrap_or_else(|| self.active.url())
    }
}
