//! Router state inference.
//!
//! # Data Flow
//! ```text
//! Notification text (from events::stream)
//!     → notice.rs (classify: Routing | Failover | Unrecognized)
//!     → tracker.rs (update active target, emit FAILOVER entry)
//!     → ActiveReader (health monitor, actions, snapshot)
//! ```
//!
//! # Design Decisions
//! - Routing decisions are made by the external proxy; we only observe them
//! - The active target is swapped atomically; readers never see partial updates

pub mod notice;
pub mod tracker;

pub use notice::{ActiveTarget, Notice, TargetClassifier, TargetRole};
pub use tracker::{ActiveReader, RouterStateTracker, TrackerUpdate};
