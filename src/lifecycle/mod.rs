//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Discover endpoint → Spawn tasks
//!
//! Tasks (task.rs):
//!     One ScheduledTask per concern (health poll, notification stream, auto-ping)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → every task leaves its loop
//! ```

pub mod shutdown;
pub mod signals;
pub mod task;

pub use shutdown::Shutdown;
pub use task::ScheduledTask;
