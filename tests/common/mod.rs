//! Shared utilities for integration tests.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

/// What the mock backend does with one request.
#[derive(Debug, Clone)]
pub enum Canned {
    Status(u16),
    /// Respond with an `X-Served-By` header.
    ServedBy(u16, &'static str),
    /// Close the socket without answering.
    Drop,
    /// Hold the connection open and never answer.
    Stall,
}

/// Request line seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub method: String,
    pub path: String,
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&Seen) -> Canned + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        handle(socket, f.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend that answers every request with the given status.
pub async fn start_mock_backend(status: u16) -> SocketAddr {
    start_programmable_backend(move |_| Canned::Status(status)).await
}

async fn handle<F>(mut socket: TcpStream, f: &F)
where
    F: Fn(&Seen) -> Canned,
{
    let Some(seen) = read_request_head(&mut socket).await else {
        return;
    };

    let (status, extra) = match f(&seen) {
        Canned::Status(status) => (status, String::new()),
        Canned::ServedBy(status, who) => (status, format!("X-Served-By: {who}\r\n")),
        Canned::Drop => return,
        Canned::Stall => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return;
        }
    };

    let body = format!("{{\"status\":{status}}}");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        extra,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) -> Option<Seen> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let mut parts = head.lines().next()?.split_whitespace();
    Some(Seen {
        method: parts.next()?.to_string(),
        path: parts.next()?.to_string(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// WebSocket server that sends `notices` on every connection, then closes it.
///
/// Returns the address and the instants at which each connection was accepted.
pub async fn start_notice_server(notices: Vec<String>) -> (SocketAddr, Arc<Mutex<Vec<Instant>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(Mutex::new(Vec::new()));
    let seen = accepted.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let Ok(mut ws) = tokio_tungstenite::accept_async(socket).await else {
                continue;
            };
            seen.lock().unwrap().push(Instant::now());

            for notice in &notices {
                if ws.send(Message::text(notice.clone())).await.is_err() {
                    break;
                }
            }
            let _ = ws.close(None).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    (addr, accepted)
}
