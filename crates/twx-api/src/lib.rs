//! # twx-api: Status Workflow API
//!
//! Axum surface over twx-state. Clients use it to list the actions a caller
//! may take and to commit transitions. Every commit is re-checked here
//! against the same workflow tables that drive the client menu, so hiding a
//! button is never the only thing stopping a request.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                        |
//! |------------------------|-------------------------------|
//! | `/v1/opportunities/*`  | [`routes::opportunities`]     |
//! | `/v1/applications/*`   | [`routes::applications`]      |
//! | `/metrics`             | [`middleware::metrics`]       |
//! | `/openapi.json`        | [`openapi`]                   |
//! | `/health/*`            | unauthenticated probes        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware so
/// they stay reachable without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::opportunities::router())
        .merge(routes::applications::router())
        .merge(openapi::router())
        .route("/metrics", get(middleware::metrics::metrics_json))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the built-in workflows have passed their
/// consistency check.
async fn readiness() -> (axum::http::StatusCode, &'static str) {
    match twx_state::validate_builtin_workflows() {
        Ok(()) => (axum::http::StatusCode::OK, "ready"),
        Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "workflow catalog inconsistent"),
    }
}
