//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TWX Workflow API",
        version = "0.1.0",
        description = "Status workflows for the work-exchange marketplace: opportunity and application transitions, eligible actions, and status reasons.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Opportunities
        crate::routes::opportunities::create_opportunity,
        crate::routes::opportunities::get_opportunity,
        crate::routes::opportunities::opportunity_actions,
        crate::routes::opportunities::transition_opportunity,
        crate::routes::opportunities::opportunity_status_reason,
        // Applications
        crate::routes::applications::create_application,
        crate::routes::applications::get_application,
        crate::routes::applications::application_actions,
        crate::routes::applications::transition_application,
        crate::routes::applications::application_status_reason,
        // Operations
        crate::middleware::metrics::metrics_json,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::TransitionRequest,
        crate::routes::HistoryEntryView,
        crate::routes::ActionView,
        crate::routes::ReasonPromptView,
        crate::routes::ActionsResponse,
        crate::routes::StatusReasonResponse,
        crate::routes::opportunities::CreateOpportunityRequest,
        crate::routes::opportunities::OpportunityView,
        crate::routes::applications::CreateApplicationRequest,
        crate::routes::applications::ApplicationView,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "opportunities", description = "Opportunity status workflow"),
        (name = "applications", description = "Application status workflow"),
        (name = "operations", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
