//! The dashboard: shared state plus the operations exposed to users.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::watch;

use crate::actions::{ActionEntry, ActionLog, Counters, LogSnapshot};
use crate::config::DashboardConfig;
use crate::dashboard::actions::ActionRunner;
use crate::dashboard::auto_ping::{AutoPingError, AutoPingStatus, AutoPinger};
use crate::dashboard::discovery::Discovery;
use crate::events::{EventStreamClient, StreamStatus};
use crate::health::{HealthBoard, HealthMonitor, HealthSnapshot};
use crate::lifecycle::{ScheduledTask, Shutdown};
use crate::resilience::RequestExecutor;
use crate::routing::{ActiveReader, ActiveTarget, RouterStateTracker, TargetClassifier};
use crate::verification::{CycleError, CycleReport, FailureCycle};

/// Everything a client needs to render the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub api_base: String,
    /// Whether discovery saw the base answer; `None` when it was given directly.
    pub api_verified: Option<bool>,
    pub active: Option<ActiveTarget>,
    pub health: HealthSnapshot,
    pub event_stream: StreamStatus,
    pub auto_ping: AutoPingStatus,
    pub counters: Counters,
    pub log_len: usize,
    pub log_capacity: usize,
}

struct Inner {
    config: DashboardConfig,
    runner: ActionRunner,
    api_verified: Option<bool>,
    log: ActionLog,
    tracker: Arc<RouterStateTracker>,
    health: HealthBoard,
    auto_ping: AutoPinger,
    stream_status: OnceLock<watch::Receiver<StreamStatus>>,
    started: AtomicBool,
    shutdown: Shutdown,
}

/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, api_base: impl Into<String>, shutdown: Shutdown) -> Self {
        Self::build(config, api_base.into(), None, shutdown)
    }

    /// Build around the outcome of [`discover_endpoint`](crate::dashboard::discover_endpoint).
    pub fn from_discovery(config: DashboardConfig, discovery: Discovery, shutdown: Shutdown) -> Self {
        Self::build(config, discovery.base, Some(discovery.verified), shutdown)
    }

    fn build(config: DashboardConfig, api_base: String, api_verified: Option<bool>, shutdown: Shutdown) -> Self {
        let executor = RequestExecutor::new(config.timeouts.request());
        let log = ActionLog::new(config.action_log.capacity);
        let health = HealthBoard::new();
        let tracker = Arc::new(
            RouterStateTracker::new(TargetClassifier::new(&config.targets), log.clone())
                .with_health(health.clone()),
        );
        let runner = ActionRunner::new(executor, api_base, tracker.reader(), log.clone());

        Self {
            inner: Arc::new(Inner {
                config,
                runner,
                api_verified,
                log,
                tracker,
                health,
                auto_ping: AutoPinger::new(),
                stream_status: OnceLock::new(),
                started: AtomicBool::new(false),
                shutdown,
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn api_base(&self) -> &str {
        self.inner.runner.base()
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.inner.log
    }

    pub fn tracker(&self) -> &RouterStateTracker {
        &self.inner.tracker
    }

    pub fn active(&self) -> ActiveReader {
        self.inner.tracker.reader()
    }

    pub fn health(&self) -> &HealthBoard {
        &self.inner.health
    }

    /// Build a health monitor bound to this dashboard's state.
    pub fn health_monitor(&self) -> HealthMonitor {
        HealthMonitor::new(
            self.executor(),
            self.api_base(),
            self.inner.config.health_check.clone(),
            self.active(),
            self.inner.health.clone(),
        )
    }

    /// Spawn the health monitor, the notification stream and, if configured, auto-ping.
    ///
    /// Later calls are no-ops and return no tasks.
    pub fn start(&self) -> Vec<ScheduledTask> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Dashboard already started");
            return Vec::new();
        }

        let config = &self.inner.config;
        let shutdown = &self.inner.shutdown;
        let mut tasks = vec![self.health_monitor().spawn(shutdown.subscribe())];

        let stream = EventStreamClient::new(
            config.api.event_stream_url.clone(),
            &config.event_stream,
            self.inner.tracker.clone(),
        )
        .with_connect_timeout(config.timeouts.request());
        let _ = self.inner.stream_status.set(stream.status());
        tasks.push(stream.spawn(shutdown.subscribe()));

        if config.auto_ping.enabled {
            if let Err(e) = self.start_auto_ping(config.auto_ping.rate_per_sec) {
                tracing::error!(error = %e, "Auto-ping not started");
            }
        }

        tasks
    }

    /// `GET` the data endpoint once.
    pub async fn fetch_data(&self) -> ActionEntry {
        self.inner.runner.get(&self.inner.config.api.data_path).await
    }

    /// `POST` an arbitrary action path (`/fail`, `/recover`) without polling.
    pub async fn post_action(&self, path: &str) -> ActionEntry {
        self.inner.runner.post(path).await
    }

    /// Inject a fault and poll until the API recovers.
    pub async fn run_failure_cycle(&self) -> Result<CycleReport, CycleError> {
        FailureCycle::new(
            self.executor(),
            self.api_base(),
            self.inner.config.health_check.path.clone(),
            self.inner.config.failure_cycle.clone(),
            self.active(),
            self.inner.log.clone(),
        )
        .run()
        .await
    }

    pub fn start_auto_ping(&self, rate_per_sec: f64) -> Result<Duration, AutoPingError> {
        self.inner.auto_ping.start(
            self.inner.runner.clone(),
            self.inner.config.api.data_path.clone(),
            rate_per_sec,
            self.inner.shutdown.subscribe(),
        )
    }

    pub fn stop_auto_ping(&self) -> bool {
        self.inner.auto_ping.stop()
    }

    pub fn clear_log(&self) {
        self.inner.log.clear();
        tracing::info!("Action log cleared");
    }

    pub fn log_snapshot(&self) -> LogSnapshot {
        self.inner.log.snapshot()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let (counters, log_len) = self.inner.log.tally();
        DashboardSnapshot {
            api_base: self.api_base().to_string(),
            api_verified: self.inner.api_verified,
            active: self.active().current().map(|t| (*t).clone()),
            health: self.inner.health.snapshot(),
            event_stream: self
                .inner
                .stream_status
                .get()
                .map(|rx| rx.borrow().clone())
                .unwrap_or_default(),
            auto_ping: self.inner.auto_ping.status(),
            counters,
            log_len,
            log_capacity: self.inner.log.capacity(),
        }
    }

    fn executor(&self) -> RequestExecutor {
        RequestExecutor::new(self.inner.config.timeouts.request())
    }
}
