//! Reconnecting WebSocket client for router notifications.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::EventStreamConfig;
use crate::lifecycle::ScheduledTask;
use crate::observability::metrics;
use crate::resilience::timeouts::DEFAULT_REQUEST_TIMEOUT;
use crate::resilience::FixedBackoff;
use crate::routing::RouterStateTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Observable state of the stream connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStatus {
    pub state: ConnectionState,
    /// Most recent connect or read error, cleared on the next successful open.
    pub last_error: Option<String>,
    /// Number of successful opens so far.
    pub opened: u64,
}

impl Default for StreamStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Closed,
            last_error: None,
            opened: 0,
        }
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How one connection ended.
enum Ended {
    Closed,
    Shutdown,
}

pub struct EventStreamClient {
    url: String,
    backoff: FixedBackoff,
    connect_timeout: Duration,
    tracker: Arc<RouterStateTracker>,
    status: watch::Sender<StreamStatus>,
}

impl EventStreamClient {
    pub fn new(
        url: impl Into<String>,
        config: &EventStreamConfig,
        tracker: Arc<RouterStateTracker>,
    ) -> Self {
        let (status, _) = watch::channel(StreamStatus::default());
        Self {
            url: url.into(),
            backoff: FixedBackoff::new(config.reconnect_backoff()),
            connect_timeout: DEFAULT_REQUEST_TIMEOUT,
            tracker,
            status,
        }
    }

    /// Deadline for the TCP connect plus WebSocket handshake. Expiry counts as a close.
    pub fn with_connect_timeout(mut self, deadline: Duration) -> Self {
        self.connect_timeout = deadline;
        self
    }

    /// Subscribe to connection state changes.
    pub fn status(&self) -> watch::Receiver<StreamStatus> {
        self.status.subscribe()
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            url = %self.url,
            backoff_ms = self.backoff.delay().as_millis() as u64,
            "Event stream starting"
        );

        loop {
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                res = timeout(self.connect_timeout, connect_async(self.url.as_str())) => res,
                _ = shutdown.recv() => break,
            };

            match connected {
                Ok(Ok((ws, _))) => {
                    self.status.send_modify(|s| {
                        s.state = ConnectionState::Open;
                        s.last_error = None;
                        s.opened += 1;
                    });
                    tracing::info!(url = %self.url, "Event stream connected");

                    if let Ended::Shutdown = self.pump(ws, &mut shutdown).await {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "Event stream connect failed");
                    self.set_error(e.to_string());
                }
                Err(_) => {
                    let ms = self.connect_timeout.as_millis() as u64;
                    tracing::warn!(url = %self.url, timeout_ms = ms, "Event stream connect timed out");
                    self.set_error(format!("connect timed out after {ms} ms"));
                }
            }

            self.set_state(ConnectionState::Closed);
            tracing::info!(
                delay_ms = self.backoff.delay().as_millis() as u64,
                "Event stream closed, reconnect scheduled"
            );
            if !self.backoff.wait(&mut shutdown).await {
                break;
            }
            metrics::record_reconnect();
        }

        self.set_state(ConnectionState::Closed);
        tracing::info!("Event stream received shutdown signal, exiting loop");
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> ScheduledTask {
        ScheduledTask::spawn("event-stream", self.run(shutdown))
    }

    async fn pump(&self, mut ws: WsStream, shutdown: &mut broadcast::Receiver<()>) -> Ended {
        loop {
            let frame = tokio::select! {
                frame = ws.next() => frame,
                _ = shutdown.recv() => {
                    let _ = ws.send(Message::Close(None)).await;
                    return Ended::Shutdown;
                }
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    self.tracker.on_notification(text.as_str());
                }
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => {
                        self.tracker.on_notification(text);
                    }
                    Err(_) => tracing::debug!(len = data.len(), "Ignoring non-UTF-8 frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(reason = ?frame, "Event stream closed by server");
                    return Ended::Closed;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Event stream error");
                    self.set_error(e.to_string());
                    return Ended::Closed;
                }
                None => return Ended::Closed,
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.status.send_if_modified(|s| {
            let changed = s.state != state;
            s.state = state;
            changed
        });
    }

    fn set_error(&self, error: String) {
        self.status.send_modify(|s| s.last_error = Some(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionLog;
    use crate::lifecycle::Shutdown;
    use crate::routing::TargetClassifier;

    #[test]
    fn test_status_serializes_lowercase_state() {
        let json = serde_json::to_value(StreamStatus::default()).unwrap();
        assert_eq!(json["state"], "closed");
    }

    #[tokio::test]
    async fn test_refused_connect_surfaces_error_and_stops_on_shutdown() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tracker = Arc::new(RouterStateTracker::new(TargetClassifier::default(), ActionLog::new(4)));
        let config = EventStreamConfig {
            reconnect_backoff_ms: 10_000,
        };
        let client = EventStreamClient::new(format!("ws://{addr}/log"), &config, tracker);
        let mut status = client.status();

        let shutdown = Shutdown::new();
        let task = client.spawn(shutdown.subscribe());

        tokio::time::timeout(
            Duration::from_secs(2),
            status.wait_for(|s| s.last_error.is_some() && s.state == ConnectionState::Closed),
        )
        .await
        .unwrap()
        .unwrap();

        // Shutdown cancels the pending reconnect timer.
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task.join()).await.unwrap();
    }

    #[tokio::test]
    async fn test_silent_host_connect_times_out() {
        // Accepts TCP but never answers the WebSocket handshake.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let tracker = Arc::new(RouterStateTracker::new(TargetClassifier::default(), ActionLog::new(4)));
        let config = EventStreamConfig {
            reconnect_backoff_ms: 10_000,
        };
        let client = EventStreamClient::new(format!("ws://{addr}/log"), &config, tracker)
            .with_connect_timeout(Duration::from_millis(100));
        let mut status = client.status();

        let shutdown = Shutdown::new();
        let task = client.spawn(shutdown.subscribe());

        let seen = tokio::time::timeout(
            Duration::from_secs(2),
            status.wait_for(|s| s.state == ConnectionState::Closed && s.last_error.is_some()),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(seen.last_error.as_deref(), Some("connect timed out after 100 ms"));
        assert_eq!(seen.opened, 0);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task.join()).await.unwrap();
    }
}
