//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DashboardConfig (validated, immutable)
//!     → sections handed to each subsystem at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, parse_config, ConfigError};

pub use schema::ActionLogConfig;
pub use schema::AdminConfig;
pub use schema::ApiConfig;
pub use schema::AutoPingConfig;
pub use schema::DashboardConfig;
pub use schema::EventStreamConfig;
pub use schema::FailureCycleConfig;
pub use schema::HealthCheckConfig;
pub use schema::ObservabilityConfig;
pub use schema::TargetConfig;
pub use schema::TimeoutConfig;
