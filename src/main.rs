//! Failover dashboard daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!     router notifications (WebSocket)          API base (HTTP)
//!                │                                  ▲   ▲
//!                ▼                                  │   │
//!     ┌──────────────────┐   active target   ┌──────┴───┴──────┐
//!     │  events::stream  │──▶ routing ──────▶│ health monitor  │
//!     └──────────────────┘   tracker         │ failure cycle   │
//!                               │            │ data / auto-ping│
//!                               ▼            └────────┬────────┘
//!                          action log ◀───────────────┘
//!                               │
//!                               ▼
//!                      admin API / dashboard-cli
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use failover_dashboard::admin::{self, AdminState};
use failover_dashboard::config::load_or_default;
use failover_dashboard::dashboard::{discover_endpoint, Dashboard};
use failover_dashboard::lifecycle::{signals::wait_for_signal, Shutdown};
use failover_dashboard::observability::{init_logging, init_metrics};
use failover_dashboard::resilience::RequestExecutor;

#[derive(Parser)]
#[command(name = "failover-dashboard")]
#[command(about = "Watch a primary/spare failover deployment", long_about = None)]
struct Args {
    /// Path to a TOML config file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    init_logging(&config.observability);
    tracing::info!("failover-dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let probe = RequestExecutor::new(config.timeouts.request());
    let Some(discovery) = discover_endpoint(&probe, &config.api.base_urls, &config.health_check.path).await else {
        return Err("no API base URL configured".into());
    };
    tracing::info!(
        api_base = %discovery.base,
        verified = discovery.verified,
        event_stream = %config.api.event_stream_url,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let dashboard = Dashboard::from_discovery(config.clone(), discovery, shutdown.clone());
    let tasks = dashboard.start();

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(dashboard.clone(), &config.admin.api_key);
        let shutdown = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }))
    } else {
        None
    };

    wait_for_signal().await;
    shutdown.trigger();
    dashboard.stop_auto_ping();

    for task in tasks {
        tracing::debug!(task = task.name(), "Waiting for task to stop");
        task.join().await;
    }
    if let Some(handle) = admin_task {
        let _ = handle.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
