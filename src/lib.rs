//! Observability core for a primary/spare failover deployment.
//!
//! Watches which backend a routing proxy is sending traffic to, probes the
//! shared API, keeps a bounded log of user actions and runs fault-injection
//! cycles that measure recovery time.

pub mod actions;
pub mod admin;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod verification;

pub use config::schema::DashboardConfig;
pub use dashboard::Dashboard;
pub use lifecycle::Shutdown;
