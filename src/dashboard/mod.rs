//! Dashboard coordinator.
//!
//! # Data Flow
//! ```text
//! events::EventStreamClient ─▶ routing::RouterStateTracker ─▶ ActiveReader
//!                                                              │
//!                 ┌────────────────────────────────────────────┤
//!                 ▼                                            ▼
//!        health::HealthMonitor                    actions.rs / auto_ping.rs /
//!                 │                               verification::FailureCycle
//!                 ▼                                            │
//!          health::HealthBoard                                 ▼
//!                                                     actions::ActionLog
//! ```
//!
//! # Design Decisions
//! - One coordinator owns all shared state; components get only the handles they need
//! - Only the tracker writes the active target; only the monitor writes health

pub mod actions;
pub mod auto_ping;
pub mod coordinator;
pub mod discovery;

pub use actions::ActionRunner;
pub use auto_ping::{period_for, AutoPingError, AutoPingStatus, AutoPinger};
pub use coordinator::{Dashboard, DashboardSnapshot};
pub use discovery::{discover_endpoint, Discovery};
