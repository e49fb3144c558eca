// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the timestamp gate service.
//!
//! The gate runs in two modes: as an access-phase middleware in front of the
//! fallback responder, and as an external auth service answering `/check`
//! for a reverse proxy.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::metrics::GateMetrics;
use crate::scope::ScopeTable;
use crate::validator::{self, Decision};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post, MethodRouter},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use url::Url;

/// Base used to resolve origin-form URIs sent to `/check`.
const CHECK_BASE_URL: &str = "http://localhost/";

/// Shared application state.
pub struct AppState {
    pub scopes: ScopeTable,
    pub clock: Arc<dyn Clock>,
    pub metrics: GateMetrics,
    pub config: Config,
}

impl AppState {
    /// Resolve every scope and register metrics for a loaded configuration.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            scopes: ScopeTable::from_config(&config)?,
            clock,
            metrics: GateMetrics::new()?,
            config,
        })
    }

    /// Run the validator for one request, sampling the clock once.
    ///
    /// Both modes pass the path through here; dot segments are resolved
    /// by the scope lookup before a location is chosen.
    pub fn evaluate(&self, path: &str, query: &str) -> Decision {
        let policy = self.scopes.resolve(path);
        let now = self.clock.now_secs();
        let decision = validator::validate(query.as_bytes(), policy, now);
        self.metrics.record(&decision);
        decision
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Timestamp check request (for external validation).
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Original request URI, absolute or origin-form (`/path?query`).
    pub uri: String,
}

/// Timestamp check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "timestamp-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Check the timestamp of a request forwarded by a reverse proxy.
///
/// Decisions are returned with 200 so the proxy can read the body; only an
/// unparsable URI yields 400.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    let url = match Url::parse(CHECK_BASE_URL).and_then(|base| base.join(&req.uri)) {
        Ok(url) => url,
        Err(err) => {
            warn!(uri = %req.uri, error = %err, "Invalid URI in check request");
            return (
                StatusCode::BAD_REQUEST,
                Json(CheckResponse {
                    allowed: false,
                    reason: Some(format!("Invalid URI: {err}")),
                    code: Some("INVALID_URI"),
                }),
            );
        }
    };

    debug!(path = %url.path(), query = ?url.query(), "Processing timestamp check");

    match state.evaluate(url.path(), url.query().unwrap_or("")) {
        Decision::Allow => (
            StatusCode::OK,
            Json(CheckResponse {
                allowed: true,
                reason: None,
                code: None,
            }),
        ),
        denied => {
            let (reason, code) = denied
                .error()
                .map(|e| (Some(e.to_string()), Some(e.code())))
                .unwrap_or((None, None));
            info!(path = %url.path(), reason = ?reason, "Timestamp check denied");
            (
                StatusCode::OK,
                Json(CheckResponse {
                    allowed: false,
                    reason,
                    code,
                }),
            )
        }
    }
}

/// Access-phase middleware: rejects requests outside the timestamp window
/// with 403 before the inner handler runs.
pub async fn timestamp_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let decision = {
        let uri = request.uri();
        state.evaluate(uri.path(), uri.query().unwrap_or(""))
    };

    match decision.error() {
        None => next.run(request).await,
        Some(err) => {
            info!(path = %request.uri().path(), error = %err, "Request denied by timestamp gate");
            (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: err.to_string(),
                    code: err.code(),
                }),
            )
                .into_response()
        }
    }
}

/// Responder for requests that passed the gate.
///
/// Stands in for the upstream a deployment would forward to.
pub async fn validated() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("X-Timestamp-Validated", "true")],
        "Request validated successfully",
    )
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the service router.
///
/// Service endpoints are not gated; every other request goes through
/// [`timestamp_guard`] to [`validated`].
pub fn router(state: Arc<AppState>) -> Router {
    let gated: MethodRouter = any(validated)
        .layer(middleware::from_fn_with_state(state.clone(), timestamp_guard))
        .with_state(state.clone());

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/check", post(check));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.fallback_service(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
