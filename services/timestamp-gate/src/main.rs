// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Timestamp Gate Service
//!
//! An access-phase filter that rejects requests whose `timestamp` query
//! parameter falls outside `now ± timestamp_range` seconds.
//!
//! ## Usage
//!
//! The service provides two modes of operation:
//!
//! 1. **External auth service**: Envoy or another proxy calls `/check` with
//!    the original request URI before forwarding.
//!
//! 2. **Direct filter**: Requests are sent directly through the service,
//!    which answers 403 or passes them on.
//!
//! ## Configuration
//!
//! Configuration is loaded from an optional JSON file and environment
//! variables (environment wins):
//!
//! - `TIMESTAMP_GATE_CONFIG`: Path to a JSON config file with locations
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `TIMESTAMP`: `on` or `off` at main scope (default: off)
//! - `TIMESTAMP_RANGE`: Tolerance in seconds (default: 180)
//! - `METRICS_ENABLED`: `on` or `off` (default: on)

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use timestamp_gate::{
    clock::SystemClock,
    config::Config,
    handlers::{router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let addr = config.socket_addr()?;
    let main_policy = config.directives.effective();
    info!(
        bind_addr = %config.bind_addr,
        timestamp = main_policy.enabled,
        timestamp_range = main_policy.range_secs,
        locations = config.locations.len(),
        metrics = config.metrics.enabled,
        "Starting timestamp gate"
    );

    let state = Arc::new(AppState::new(config, Arc::new(SystemClock))?);
    let app = router(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
