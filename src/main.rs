//! This file defines the groundwater-hpi binary entry point.

use groundwater_hpi::app;
use groundwater_hpi::app_state::AppState;
use groundwater_hpi::cli;
use groundwater_hpi::metrics;
use groundwater_hpi::server;
use groundwater_hpi::tracing;

use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    ::tracing::debug!(?args, "parsed command line arguments");
    metrics::register_metrics();
    let state = Arc::new(AppState::new(&args));
    let service = app::service(state);
    server::serve(&args, service).await;
}
