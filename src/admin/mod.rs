//! Authenticated HTTP control surface for the dashboard.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::dashboard::Dashboard;
use crate::lifecycle::Shutdown;

#[derive(Clone)]
pub struct AdminState {
    pub dashboard: Dashboard,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(dashboard: Dashboard, api_key: &str) -> Self {
        Self {
            dashboard,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/log", get(get_log))
        .route("/admin/log/clear", post(clear_log))
        .route("/admin/data", post(fetch_data))
        .route("/admin/fail", post(inject_fault))
        .route("/admin/recover", post(recover))
        .route("/admin/cycle", post(run_cycle))
        .route("/admin/auto-ping", post(start_auto_ping).delete(stop_auto_ping))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown is triggered.
pub async fn serve(listener: TcpListener, state: AdminState, shutdown: Shutdown) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
