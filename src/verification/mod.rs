//! Failure-injection verification.
//!
//! # Data Flow
//! ```text
//! POST /fail (executor) → log entry
//!     → on transport/timeout error: abort
//!     → poll GET /health every poll_delay until 200 or a guard trips
//!     → one RECOVERY summary entry + CycleReport
//! ```

pub mod cycle;

pub use cycle::{error_rate_percent, CycleError, CycleReport, FailureCycle, RECOVERY_ACTION};
