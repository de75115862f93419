//! Notification stream driving the router-state tracker.

use std::sync::Arc;
use std::time::Duration;

use failover_dashboard::actions::{ActionLog, FAILOVER_ACTION};
use failover_dashboard::config::EventStreamConfig;
use failover_dashboard::events::{ConnectionState, EventStreamClient};
use failover_dashboard::routing::{RouterStateTracker, TargetClassifier, TargetRole};
use failover_dashboard::Shutdown;

mod common;

fn tracker(log: &ActionLog) -> Arc<RouterStateTracker> {
    Arc::new(RouterStateTracker::new(TargetClassifier::default(), log.clone()))
}

#[tokio::test]
async fn test_notices_drive_active_target() {
    let (addr, _) = common::start_notice_server(vec![
        "Proxying request: /api/data -> http://backend-primary:8022/api/data".into(),
        "unrelated log line".into(),
        "Switching active target to: http://backend-spare:8023".into(),
    ])
    .await;

    let log = ActionLog::new(16);
    let tracker = tracker(&log);
    let active = tracker.reader();
    let config = EventStreamConfig {
        reconnect_backoff_ms: 5_000,
    };
    let client = EventStreamClient::new(format!("ws://{addr}/log"), &config, tracker);
    let mut status = client.status();

    let shutdown = Shutdown::new();
    let task = client.spawn(shutdown.subscribe());

    tokio::time::timeout(
        Duration::from_secs(2),
        status.wait_for(|s| s.opened == 1 && s.state == ConnectionState::Closed),
    )
    .await
    .unwrap()
    .unwrap();

    let current = active.current().unwrap();
    assert_eq!(current.role, TargetRole::Spare);
    assert_eq!(current.url, "http://backend-spare:8023");

    let entries = log.snapshot().entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, FAILOVER_ACTION);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), task.join()).await.unwrap();
}

#[tokio::test]
async fn test_reconnects_after_backoff_and_not_before() {
    let (addr, accepted) = common::start_notice_server(Vec::new()).await;

    let log = ActionLog::new(4);
    let config = EventStreamConfig {
        reconnect_backoff_ms: 300,
    };
    let client = EventStreamClient::new(format!("ws://{addr}/log"), &config, tracker(&log));
    let mut status = client.status();

    let shutdown = Shutdown::new();
    let task = client.spawn(shutdown.subscribe());

    tokio::time::timeout(Duration::from_secs(3), status.wait_for(|s| s.opened >= 2))
        .await
        .unwrap()
        .unwrap();

    let times = accepted.lock().unwrap().clone();
    assert!(times.len() >= 2);
    let gap = times[1] - times[0];
    assert!(gap >= Duration::from_millis(300), "reconnected after {gap:?}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), task.join()).await.unwrap();
}
