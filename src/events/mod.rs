//! Router notification stream.
//!
//! # Data Flow
//! ```text
//! connecting ──connect ok──▶ open ──close/error──▶ closed
//!     ▲                                              │
//!     └──────────── fixed backoff (1.5 s) ───────────┘
//!
//! open: every text frame → routing::RouterStateTracker
//! ```
//!
//! # Design Decisions
//! - Exactly one connection object at a time; the loop is sequential
//! - Errors set an indicator; reconnection is driven by the close that follows
//! - Shutdown interrupts both an open connection and a pending backoff

pub mod stream;

pub use stream::{ConnectionState, EventStreamClient, StreamStatus};
