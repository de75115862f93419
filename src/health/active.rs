//! Active health polling.
//!
//! # Responsibilities
//! - Periodically probe the shared API base
//! - Attribute the result to whichever target the router currently uses
//! - Keep the other target explicitly Unknown

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::state::{HealthBoard, HealthRecord};
use crate::lifecycle::ScheduledTask;
use crate::observability::metrics;
use crate::resilience::{RequestError, RequestExecutor};
use crate::routing::{ActiveReader, TargetRole};

/// Result of one monitor tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Response received and attributed to the active target.
    Observed { role: TargetRole, record: HealthRecord },
    /// Response received but no active target is known yet.
    Unattributed { status: u16 },
    /// The router switched targets while the probe was in flight; result dropped.
    Superseded { status: u16 },
    /// No response: timeout or transport failure.
    Offline(RequestError),
}

pub struct HealthMonitor {
    executor: RequestExecutor,
    base: String,
    config: HealthCheckConfig,
    active: ActiveReader,
    board: HealthBoard,
}

impl HealthMonitor {
    pub fn new(
        executor: RequestExecutor,
        base: impl Into<String>,
        config: HealthCheckConfig,
        active: ActiveReader,
        board: HealthBoard,
    ) -> Self {
        Self {
            executor,
            base: base.into(),
            config,
            active,
            board,
        }
    }

    /// Probe once and update the board.
    pub async fn tick(&self) -> TickOutcome {
        let active = self
            .active
            .current()
            .filter(|t| t.role != TargetRole::Unknown);

        let result = self.executor.get(&self.base, &self.config.path).await;
        if let Ok(reply) = &result {
            metrics::record_request_latency("health", reply.latency);
        }

        match result {
            Ok(reply) => match active {
                Some(target) if self.active.current().map(|t| t.role) != Some(target.role) => {
                    tracing::debug!(status = reply.status, "Active target changed during probe, result dropped");
                    TickOutcome::Superseded {
                        status: reply.status,
                    }
                }
                Some(target) => {
                    let record = HealthRecord::observed(reply.status, reply.latency);
                    self.board.observe(target.role, record);
                    metrics::record_target_health(target.role, Some(reply.status == 200));
                    if let Some(other) = target.role.counterpart() {
                        metrics::record_target_health(other, None);
                    }
                    tracing::debug!(
                        target_url = %target.url,
                        status = reply.status,
                        latency_ms = record.last_latency_ms,
                        "Health probe"
                    );
                    TickOutcome::Observed {
                        role: target.role,
                        record,
                    }
                }
                None => {
                    self.board.reset(false);
                    tracing::debug!(status = reply.status, "Health probe before any routing notice");
                    TickOutcome::Unattributed {
                        status: reply.status,
                    }
                }
            },
            Err(e) => {
                tracing::warn!(base = %self.base, error = %e, "Health probe failed, API offline");
                self.board.reset(true);
                metrics::record_target_health(TargetRole::Primary, None);
                metrics::record_target_health(TargetRole::Spare, None);
                TickOutcome::Offline(e)
            }
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.config.interval_ms,
            path = %self.config.path,
            base = %self.base,
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run on a background task that can be cancelled on its own.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> ScheduledTask {
        ScheduledTask::spawn("health-monitor", self.run(shutdown))
    }
}
