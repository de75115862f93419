//! Fixed-delay backoff.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

/// A constant delay between attempts. The attempt number never stretches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the delay unless shutdown fires first.
    ///
    /// Returns `false` when shutdown interrupted the wait.
    pub async fn wait(&self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        tokio::select! {
            _ = sleep(self.delay) => true,
            _ = shutdown.recv() => false,
        }
    }
}
