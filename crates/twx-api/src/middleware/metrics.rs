//! # Request Metrics
//!
//! In-process atomic counters, served as JSON at `GET /metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    request_count: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
    transition_count: Arc<AtomicU64>,
    rejected_transition_count: Arc<AtomicU64>,
}

/// Snapshot of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    /// Requests served.
    pub requests: u64,
    /// Responses with a 4xx or 5xx status.
    pub errors: u64,
    /// Status transitions committed.
    pub transitions: u64,
    /// Status transition requests refused.
    pub rejected_transitions: u64,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a committed transition.
    pub fn record_transition(&self) {
        self.transition_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a refused transition.
    pub fn record_rejected_transition(&self) {
        self.rejected_transition_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.request_count.load(Ordering::Relaxed),
            errors: self.error_count.load(Ordering::Relaxed),
            transitions: self.transition_count.load(Ordering::Relaxed),
            rejected_transitions: self.rejected_transition_count.load(Ordering::Relaxed),
        }
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        if response.status().is_server_error() || response.status().is_client_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}

/// GET /metrics: Current counters.
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Counter snapshot", body = MetricsSnapshot)),
    tag = "operations"
)]
pub async fn metrics_json(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
