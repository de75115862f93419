//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Read active target from the router tracker
//!     → Probe the shared API base
//!     → Update state.rs for the active target, Unknown for the other
//!
//! State (state.rs):
//!     Up | Down | Unknown per target, plus an offline flag
//! ```
//!
//! # Design Decisions
//! - The router hides individual targets; only the routed one is observable
//! - No direct per-target probing

pub mod active;
pub mod state;

pub use active::{HealthMonitor, TickOutcome};
pub use state::{HealthBoard, HealthRecord, HealthSnapshot, HealthState};
