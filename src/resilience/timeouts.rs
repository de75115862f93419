//! Bounded request execution.
//!
//! # Responsibilities
//! - Issue one outbound HTTP call against a base URL + relative path
//! - Enforce a hard deadline covering connect, headers and body
//! - Cancel the in-flight call when the deadline fires or the caller drops it
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the deadline future is dropped with the call
//! - Timeout errors are distinct from transport errors
//! - Never logs outcomes and never retries; callers own both

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;

/// Default deadline for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(2500);

/// Header a proxy may add to name the instance that answered.
pub const SERVED_BY_HEADER: &str = "x-served-by";

/// Failure of a bounded request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No complete response within the deadline.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection refused, reset, DNS failure, truncated response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Base URL and path do not form a URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// A response received within the deadline.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    /// Wall time from issuing the request to the end of the body.
    pub latency: Duration,
}

impl Reply {
    /// Value of the `X-Served-By` header, if the proxy sent one.
    pub fn served_by(&self) -> Option<&str> {
        self.headers
            .get(SERVED_BY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Whole milliseconds, never below 1.
pub fn latency_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round().max(1.0) as u64
}

/// Issues single HTTP requests under a hard deadline.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    default_timeout: Duration,
}

impl RequestExecutor {
    /// Create an executor whose calls default to `default_timeout`.
    pub fn new(default_timeout: Duration) -> Self {
        // Connections are not pooled so a restarted backend is reached on a fresh socket.
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            default_timeout,
        }
    }

    /// `GET {base}{path}` with the default deadline.
    pub async fn get(&self, base: &str, path: &str) -> Result<Reply, RequestError> {
        self.execute(base, path, Method::GET, self.default_timeout).await
    }

    /// `POST {base}{path}` with the default deadline.
    pub async fn post(&self, base: &str, path: &str) -> Result<Reply, RequestError> {
        self.execute(base, path, Method::POST, self.default_timeout).await
    }

    /// Issue one request and wait at most `deadline` for the complete response.
    pub async fn execute(
        &self,
        base: &str,
        path: &str,
        method: Method,
        deadline: Duration,
    ) -> Result<Reply, RequestError> {
        let url = join_url(base, path)?;
        let started = Instant::now();

        let call = async {
            let response = self
                .client
                .request(method, url)
                .send()
                .await
                .map_err(transport)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.text().await.map_err(transport)?;
            Ok::<_, RequestError>((status, headers, body))
        };

        // Dropping `call` on expiry aborts the connection.
        let (status, headers, body) = timeout(deadline, call)
            .await
            .map_err(|_| RequestError::Timeout(deadline))??;

        Ok(Reply {
            status,
            headers,
            body,
            latency: started.elapsed(),
        })
    }
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

fn transport(err: reqwest::Error) -> RequestError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    RequestError::Transport(message)
}

fn join_url(base: &str, path: &str) -> Result<reqwest::Url, RequestError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    reqwest::Url::parse(&raw).map_err(|e| RequestError::InvalidUrl(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        let url = join_url("http://localhost:8021/", "/health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8021/health");

        let url = join_url("http://proxy/api", "data").unwrap();
        assert_eq!(url.as_str(), "http://proxy/api/data");
    }

    #[test]
    fn test_join_url_rejects_garbage() {
        assert!(matches!(
            join_url("not a url", "/health"),
            Err(RequestError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_latency_rounds_and_floors_at_one() {
        assert_eq!(latency_ms(Duration::from_micros(10)), 1);
        assert_eq!(latency_ms(Duration::from_micros(2_600)), 3);
        assert_eq!(latency_ms(Duration::from_millis(150)), 150);
    }

    #[test]
    fn test_error_display() {
        let err = RequestError::Timeout(Duration::from_millis(2500));
        assert_eq!(err.to_string(), "request timed out after 2500 ms");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let executor = RequestExecutor::new(Duration::from_secs(2));
        let err = executor.get(&format!("http://{addr}"), "/health").await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
    }
}
