//! Owned handles to spawned background tasks.

use std::future::Future;
use tokio::task::JoinHandle;

/// A spawned task that can be cancelled independently of every other task.
///
/// Dropping the handle does not stop the task; call [`ScheduledTask::cancel`].
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task at its next suspension point.
    pub fn cancel(self) {
        tracing::debug!(task = self.name, "Cancelling task");
        self.handle.abort();
    }

    /// Wait for the task to finish on its own.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                tracing::error!(task = self.name, "Task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_stops_only_that_task() {
        let a = Arc::new(AtomicU32::new(0));
        let b = Arc::new(AtomicU32::new(0));

        let spawn_counter = |counter: Arc<AtomicU32>| async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        let task_a = ScheduledTask::spawn("a", spawn_counter(a.clone()));
        let task_b = ScheduledTask::spawn("b", spawn_counter(b.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        task_a.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let a_after_cancel = a.load(Ordering::SeqCst);
        let b_before = b.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(a.load(Ordering::SeqCst), a_after_cancel);
        assert!(b.load(Ordering::SeqCst) > b_before);
        assert!(!task_b.is_finished());
        task_b.cancel();
    }
}
