//! Periodic data requests at a user-chosen rate.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::validation::MAX_AUTO_PING_RATE;
use crate::dashboard::actions::ActionRunner;
use crate::lifecycle::ScheduledTask;

/// Shortest allowed period between pings.
pub const MIN_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AutoPingError {
    #[error("rate {0} req/s is outside (0, 10]")]
    InvalidRate(f64),
}

/// `max(100, round(1000 / rate))` milliseconds.
pub fn period_for(rate_per_sec: f64) -> Result<Duration, AutoPingError> {
    if !(rate_per_sec > 0.0 && rate_per_sec <= MAX_AUTO_PING_RATE) {
        return Err(AutoPingError::InvalidRate(rate_per_sec));
    }
    let ms = (1000.0 / rate_per_sec).round() as u64;
    Ok(Duration::from_millis(ms).max(MIN_PERIOD))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoPingStatus {
    pub enabled: bool,
    pub period_ms: Option<u64>,
}

struct Running {
    task: ScheduledTask,
    period: Duration,
}

/// Owns at most one auto-ping timer.
#[derive(Default)]
pub struct AutoPinger {
    running: Mutex<Option<Running>>,
}

impl AutoPinger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pinging `path`, replacing any running timer.
    pub fn start(
        &self,
        runner: ActionRunner,
        path: String,
        rate_per_sec: f64,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<Duration, AutoPingError> {
        let period = period_for(rate_per_sec)?;

        let mut running = self.lock();
        if let Some(previous) = running.take() {
            previous.task.cancel();
        }

        tracing::info!(period_ms = period.as_millis() as u64, path = %path, "Auto-ping on");
        let task = ScheduledTask::spawn("auto-ping", ping_loop(runner, path, period, shutdown));
        *running = Some(Running { task, period });
        Ok(period)
    }

    /// Cancel the timer. Returns whether one was running.
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(previous) => {
                previous.task.cancel();
                tracing::info!("Auto-ping off");
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> AutoPingStatus {
        match self.lock().as_ref() {
            Some(r) if !r.task.is_finished() => AutoPingStatus {
                enabled: true,
                period_ms: Some(r.period.as_millis() as u64),
            },
            _ => AutoPingStatus {
                enabled: false,
                period_ms: None,
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn ping_loop(runner: ActionRunner, path: String, period: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first ping goes out one period after start.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Pings overlap like independent clicks; each is bounded by the executor deadline.
                let runner = runner.clone();
                let path = path.clone();
                tokio::spawn(async move {
                    runner.get(&path).await;
                });
            }
            _ = shutdown.recv() => break,
        }
    }
}
