//! Action log subsystem.
//!
//! # Data Flow
//! ```text
//! Any completed user-visible operation
//!     → entry.rs (ActionEntry, classified once on creation)
//!     → log.rs (ActionLog::append: count, insert at front, evict tail)
//!     → snapshot() for the admin API
//! ```
//!
//! # Design Decisions
//! - Single append entry point; entries are never mutated after insertion
//! - Counters and entries live under one lock so clear() is atomic to readers

pub mod entry;
pub mod log;

pub use entry::{ActionEntry, Class, ResultCode, FAILOVER_ACTION};
pub use log::{ActionLog, Counters, LogSnapshot};
