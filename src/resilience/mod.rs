//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → timeouts.rs (hard deadline, cancellation, normalized errors)
//!
//! Notification stream drop:
//!     → backoff.rs (constant delay, interruptible by shutdown)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - The executor never retries; polling policy belongs to the caller
//! - Reconnect delay is constant, not exponential

pub mod backoff;
pub mod timeouts;

pub use backoff::FixedBackoff;
pub use timeouts::{latency_ms, Reply, RequestError, RequestExecutor};
