//! # Opportunity Status API
//!
//! Create listings, read them with their history, list the actions the
//! caller may take, commit status transitions, and look up the latest
//! reason for a status.
//!
//! A transition request is checked in this order, all under one store
//! write lock:
//!
//! 1. the caller owns the listing or is an admin (403, the same answer a
//!    `GET` gives a caller who may not see it),
//! 2. the edge is legal from the current status (409),
//! 3. the caller's role is offered an action with that target (403),
//! 4. a required reason is present (422).
//!
//! Every refused request counts as a rejected transition, including
//! malformed bodies, unknown statuses, and missing listings.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use twx_core::{OpportunityId, Role, UserId};
use twx_state::{Opportunity, OpportunityStatus, WorkflowStatus};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    actions_response, history_view, parse_status, status_reason_response, ActionsQuery,
    ActionsResponse, HistoryEntryView, StatusReasonQuery, StatusReasonResponse,
    TransitionRequest,
};
use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Longest accepted title, in characters.
const MAX_TITLE_CHARS: usize = 200;

/// Request to create an opportunity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOpportunityRequest {
    pub title: String,
    /// Owning host. Hosts may omit it; admins must supply it.
    pub host_id: Option<Uuid>,
}

impl Validate for CreateOpportunityRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(format!("title must not exceed {MAX_TITLE_CHARS} characters"));
        }
        Ok(())
    }
}

/// An opportunity with its status history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpportunityView {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub status: String,
    pub history: Vec<HistoryEntryView>,
}

impl From<&Opportunity> for OpportunityView {
    fn from(opp: &Opportunity) -> Self {
        Self {
            id: *opp.id.as_uuid(),
            host_id: *opp.host_id.as_uuid(),
            title: opp.title.clone(),
            status: opp.status().to_string(),
            history: history_view(opp.lifecycle.history()),
        }
    }
}

/// Build the opportunities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/opportunities", post(create_opportunity))
        .route("/v1/opportunities/{id}", get(get_opportunity))
        .route("/v1/opportunities/{id}/actions", get(opportunity_actions))
        .route("/v1/opportunities/{id}/status", put(transition_opportunity))
        .route("/v1/opportunities/{id}/status-reason", get(opportunity_status_reason))
}

fn load(state: &AppState, id: Uuid) -> Result<Opportunity, AppError> {
    state
        .opportunities
        .get(&OpportunityId::from(id))
        .ok_or_else(|| AppError::NotFound(format!("opportunity {id} not found")))
}

fn load_visible(state: &AppState, caller: &CallerIdentity, id: Uuid) -> Result<Opportunity, AppError> {
    let opp = load(state, id)?;
    if caller.can_view_opportunity(&opp) {
        Ok(opp)
    } else {
        Err(AppError::Forbidden(format!("opportunity {id} is not visible to caller")))
    }
}

/// POST /v1/opportunities: Create a draft listing.
#[utoipa::path(
    post,
    path = "/v1/opportunities",
    request_body = CreateOpportunityRequest,
    responses(
        (status = 201, description = "Opportunity created", body = OpportunityView),
        (status = 403, description = "Caller may not create listings", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "opportunities"
)]
pub async fn create_opportunity(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateOpportunityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OpportunityView>), AppError> {
    let req = extract_validated_json(body)?;
    require_role(&caller, &[Role::Host, Role::Admin, Role::SuperAdmin])?;

    let host_id = match (caller.role, req.host_id.map(UserId::from)) {
        (Role::Host, Some(requested)) if !caller.is_user(requested) => {
            return Err(AppError::Forbidden(
                "hosts may only create listings for themselves".to_string(),
            ));
        }
        (Role::Host, _) => caller
            .user_id
            .ok_or_else(|| AppError::Unauthorized("host token has no user binding".to_string()))?,
        (_, Some(requested)) => requested,
        (_, None) => {
            return Err(AppError::Validation(
                "host_id is required when an admin creates a listing".to_string(),
            ));
        }
    };

    let opp = Opportunity::new(host_id, req.title.trim());
    state.opportunities.insert(opp.id, opp.clone());
    tracing::info!(entity = "opportunity", id = %opp.id, host = %host_id, "opportunity created");

    Ok((StatusCode::CREATED, Json(OpportunityView::from(&opp))))
}

/// GET /v1/opportunities/{id}: Fetch a listing with its history.
#[utoipa::path(
    get,
    path = "/v1/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity found", body = OpportunityView),
        (status = 403, description = "Not visible to caller", body = crate::error::ErrorBody),
        (status = 404, description = "Opportunity not found", body = crate::error::ErrorBody),
    ),
    tag = "opportunities"
)]
pub async fn get_opportunity(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<OpportunityView>, AppError> {
    let opp = load_visible(&state, &caller, id)?;
    Ok(Json(OpportunityView::from(&opp)))
}

/// GET /v1/opportunities/{id}/actions: Actions the caller may take.
///
/// Callers who may not manage the listing get an empty list.
#[utoipa::path(
    get,
    path = "/v1/opportunities/{id}/actions",
    params(("id" = Uuid, Path, description = "Opportunity ID"), ActionsQuery),
    responses(
        (status = 200, description = "Eligible actions in display order", body = ActionsResponse),
        (status = 404, description = "Opportunity not found", body = crate::error::ErrorBody),
    ),
    tag = "opportunities"
)]
pub async fn opportunity_actions(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<ActionsResponse>, AppError> {
    let opp = load_visible(&state, &caller, id)?;
    let workflow = OpportunityStatus::workflow();
    let actions = if caller.can_manage_opportunity(&opp) {
        workflow.available_actions(opp.status(), caller.role, query.include_save)
    } else {
        Vec::new()
    };
    Ok(Json(actions_response(workflow, opp.status(), caller.role, &actions)))
}

/// PUT /v1/opportunities/{id}/status: Commit a status transition.
#[utoipa::path(
    put,
    path = "/v1/opportunities/{id}/status",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition committed", body = OpportunityView),
        (status = 403, description = "Caller may not make this transition", body = crate::error::ErrorBody),
        (status = 404, description = "Opportunity not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition from current status", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown status or missing reason", body = crate::error::ErrorBody),
    ),
    tag = "opportunities"
)]
pub async fn transition_opportunity(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<OpportunityView>, AppError> {
    match commit_transition(&state, &caller, id, body) {
        Ok((from, to, view)) => {
            metrics.record_transition();
            tracing::info!(
                entity = "opportunity",
                id = %id,
                from = %from,
                to = %to,
                role = %caller.role,
                "status changed"
            );
            Ok(Json(view))
        }
        Err(err) => {
            metrics.record_rejected_transition();
            tracing::warn!(
                entity = "opportunity",
                id = %id,
                role = %caller.role,
                error = %err,
                "status change refused"
            );
            Err(err)
        }
    }
}

/// Parse, check, and apply one transition request. Returns the previous
/// status, the new status, and the updated view.
fn commit_transition(
    state: &AppState,
    caller: &CallerIdentity,
    id: Uuid,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<(OpportunityStatus, OpportunityStatus, OpportunityView), AppError> {
    let req = extract_validated_json(body)?;
    let target: OpportunityStatus = parse_status(&req.status)?;
    let workflow = OpportunityStatus::workflow();
    let reason = req.reason.as_deref();

    state
        .opportunities
        .try_update(&OpportunityId::from(id), |opp| -> Result<_, AppError> {
            // Same answer as GET for callers who may not see the listing,
            // before anything about its status is revealed.
            if !caller.can_view_opportunity(opp) {
                return Err(AppError::Forbidden(format!(
                    "opportunity {id} is not visible to caller"
                )));
            }
            if !caller.can_manage_opportunity(opp) {
                return Err(AppError::Forbidden(format!(
                    "opportunity {id} is not managed by caller"
                )));
            }
            let from = opp.status();
            workflow.check_edge(from, target)?;
            workflow.authorize(from, target, caller.role)?;
            workflow.check_reason(from, target, reason)?;
            opp.apply_transition(target, reason, caller.user_id)?;
            Ok((from, target, OpportunityView::from(&*opp)))
        })
        .unwrap_or_else(|| Err(AppError::NotFound(format!("opportunity {id} not found"))))
}

/// GET /v1/opportunities/{id}/status-reason: Latest reason for a status.
#[utoipa::path(
    get,
    path = "/v1/opportunities/{id}/status-reason",
    params(("id" = Uuid, Path, description = "Opportunity ID"), StatusReasonQuery),
    responses(
        (status = 200, description = "Latest reason, or null", body = StatusReasonResponse),
        (status = 404, description = "Opportunity not found", body = crate::error::ErrorBody),
    ),
    tag = "opportunities"
)]
pub async fn opportunity_status_reason(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusReasonQuery>,
) -> Result<Json<StatusReasonResponse>, AppError> {
    let opp = load_visible(&state, &caller, id)?;
    Ok(Json(status_reason_response(
        opp.lifecycle.history(),
        &query.status,
    )))
}
