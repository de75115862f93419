//! Active-target inference from router notifications.
//!
//! The tracker is the only writer of the active target. Everything else reads
//! it through an [`ActiveReader`].

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::actions::{ActionEntry, ActionLog, ResultCode, FAILOVER_ACTION};
use crate::health::HealthBoard;
use crate::observability::metrics;
use crate::routing::notice::{ActiveTarget, Notice, TargetClassifier};

/// What a single notification did to the tracked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerUpdate {
    pub active_changed: bool,
    pub new_active: Option<ActiveTarget>,
}

impl TrackerUpdate {
    fn ignored() -> Self {
        Self {
            active_changed: false,
            new_active: None,
        }
    }
}

/// Read-only view of the active target.
#[derive(Debug, Clone)]
pub struct ActiveReader {
    active: Arc<ArcSwapOption<ActiveTarget>>,
}

impl ActiveReader {
    pub fn current(&self) -> Option<Arc<ActiveTarget>> {
        self.active.load_full()
    }

    /// URL of the active target, empty before the first notice.
    pub fn url(&self) -> String {
        self.current().map(|t| t.url.clone()).unwrap_or_default()
    }
}

/// Consumes router notifications and maintains the active target.
#[derive(Debug)]
pub struct RouterStateTracker {
    classifier: TargetClassifier,
    active: Arc<ArcSwapOption<ActiveTarget>>,
    log: ActionLog,
    health: Option<HealthBoard>,
}

impl RouterStateTracker {
    pub fn new(classifier: TargetClassifier, log: ActionLog) -> Self {
        Self {
            classifier,
            active: Arc::new(ArcSwapOption::empty()),
            log,
            health: None,
        }
    }

    /// Invalidate the inactive target's health on every role change.
    pub fn with_health(mut self, board: HealthBoard) -> Self {
        self.health = Some(board);
        self
    }

    pub fn reader(&self) -> ActiveReader {
        ActiveReader {
            active: self.active.clone(),
        }
    }

    pub fn on_notification(&self, raw: &str) -> TrackerUpdate {
        let notice = Notice::parse(raw);
        let Some(url) = notice.target() else {
            tracing::debug!(message = %raw, "Unrecognized router notification");
            return TrackerUpdate::ignored();
        };

        let target = self.classifier.identify(url);
        let previous = self.active.swap(Some(Arc::new(target.clone())));
        let active_changed = previous.as_deref() != Some(&target);

        let role_changed = previous.as_ref().map(|p| p.role) != Some(target.role);
        if role_changed {
            if let Some(board) = &self.health {
                board.retarget(target.role);
            }
        }

        if active_changed {
            tracing::info!(
                target_url = %target.url,
                role = %target.role,
                previous = previous.as_ref().map(|p| p.url.as_str()).unwrap_or("none"),
                "Active target changed"
            );
        }

        if let Notice::Failover { .. } = notice {
            tracing::warn!(target_url = %target.url, role = %target.role, "Router failover");
            metrics::record_failover(target.role);
            self.log.append(
                ActionEntry::new(FAILOVER_ACTION, ResultCode::None)
                    .served_by(target.url.clone())
                    .detail(raw.trim()),
            );
        }

        TrackerUpdate {
            active_changed,
            new_active: Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::notice::TargetRole;

    fn tracker() -> (RouterStateTracker, ActionLog) {
        let log = ActionLog::new(10);
        (RouterStateTracker::new(TargetClassifier::default(), log.clone()), log)
    }

    #[test]
    fn test_unknown_before_first_notice() {
        let (tracker, _) = tracker();
        assert!(tracker.reader().current().is_none());
        assert_eq!(tracker.reader().url(), "");
    }

    #[test]
    fn test_routing_notice_sets_active_without_log_entry() {
        let (tracker, log) = tracker();
        let update = tracker.on_notification("Proxying request: /api/data -> http://backend-primary:8021");

        assert!(update.active_changed);
        assert_eq!(update.new_active.unwrap().role, TargetRole::Primary);
        assert_eq!(tracker.reader().current().unwrap().role, TargetRole::Primary);
        assert!(log.is_empty());
    }

    #[test]
    fn test_failover_notice_appends_exactly_one_entry() {
        let (tracker, log) = tracker();
        let raw = "Switching active target to: http://backend-spare:8023";
        let update = tracker.on_notification(raw);
        assert!(update.active_changed);
        assert_eq!(tracker.reader().current().unwrap().role, TargetRole::Spare);

        let again = tracker.on_notification("Proxying request: /api/data -> http://backend-spare:8023");
        assert!(!again.active_changed);

        let snapshot = log.snapshot();
        assert_eq!(snapshot.entries.len(), 1);
        let entry = &snapshot.entries[0];
        assert_eq!(entry.action, FAILOVER_ACTION);
        assert_eq!(entry.detail.as_deref(), Some(raw));
        assert_eq!(entry.served_by, "http://backend-spare:8023");
    }

    #[test]
    fn test_routing_change_never_logs_failover() {
        let (tracker, log) = tracker();
        tracker.on_notification("Proxying request: /a -> http://localhost:8022");
        let update = tracker.on_notification("Proxying request: /a -> http://localhost:8023");
        assert!(update.active_changed);
        assert!(log.is_empty());
    }

    #[test]
    fn test_failover_invalidates_previous_target_health() {
        use crate::health::{HealthRecord, HealthState};
        use std::time::Duration;

        let board = HealthBoard::new();
        let tracker = RouterStateTracker::new(TargetClassifier::default(), ActionLog::new(4)).with_health(board.clone());

        tracker.on_notification("Proxying request: /api/data -> http://backend-primary:8022/api/data");
        board.observe(TargetRole::Primary, HealthRecord::observed(200, Duration::from_millis(3)));

        // Same role again: the record survives.
        tracker.on_notification("Proxying request: /api/data -> http://backend-primary:8022/api/data");
        assert_eq!(board.snapshot().primary.state, HealthState::Up);

        tracker.on_notification("Switching active target to: http://backend-spare:8023");
        let s = board.snapshot();
        assert_eq!(s.primary.state, HealthState::Unknown);
        assert_eq!(s.spare.state, HealthState::Unknown);
    }

    #[test]
    fn test_unrecognized_leaves_state_alone() {
        let (tracker, _) = tracker();
        tracker.on_notification("Proxying request: /a -> http://localhost:8022");
        let update = tracker.on_notification("Test backend listening on :8022");
        assert_eq!(update, TrackerUpdate::ignored());
        assert_eq!(tracker.reader().url(), "http://localhost:8022");
    }
}
