//! # Application Status API
//!
//! Travellers apply to published opportunities; hosts decide; either side
//! may leave at the points the workflow allows.
//!
//! Transition checks run under one store write lock, in order:
//!
//! 1. the caller is a party to the application (403, the same answer a
//!    `GET` gives a stranger),
//! 2. the edge is legal from the current status (409),
//! 3. the caller's role is offered an action with that target, and that
//!    action belongs to the caller's side: hosts use host-only actions,
//!    applicants the rest, admins anything (403),
//! 4. a required reason is present (422).
//!
//! Every refused request counts as a rejected transition.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use twx_core::{ApplicationId, OpportunityId, UserId};
use twx_state::{Application, ApplicationStatus, OpportunityStatus, WorkflowStatus};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    actions_response, history_view, parse_status, status_reason_response, ActionsQuery,
    ActionsResponse, HistoryEntryView, StatusReasonQuery, StatusReasonResponse,
    TransitionRequest,
};
use crate::auth::{ApplicationParty, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Request to apply to an opportunity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApplicationRequest {
    pub opportunity_id: Uuid,
    /// The traveller. Travellers may omit it; admins must supply it.
    pub applicant_id: Option<Uuid>,
}

impl Validate for CreateApplicationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.opportunity_id.is_nil() {
            return Err("opportunity_id must not be the nil UUID".to_string());
        }
        Ok(())
    }
}

/// An application with its status history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationView {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub applicant_id: Uuid,
    pub host_id: Uuid,
    pub status: String,
    pub history: Vec<HistoryEntryView>,
}

impl From<&Application> for ApplicationView {
    fn from(app: &Application) -> Self {
        Self {
            id: *app.id.as_uuid(),
            opportunity_id: *app.opportunity_id.as_uuid(),
            applicant_id: *app.applicant_id.as_uuid(),
            host_id: *app.host_id.as_uuid(),
            status: app.status().to_string(),
            history: history_view(app.lifecycle.history()),
        }
    }
}

/// Build the applications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/applications", post(create_application))
        .route("/v1/applications/{id}", get(get_application))
        .route("/v1/applications/{id}/actions", get(application_actions))
        .route("/v1/applications/{id}/status", put(transition_application))
        .route("/v1/applications/{id}/status-reason", get(application_status_reason))
}

fn load_as_party(
    state: &AppState,
    caller: &CallerIdentity,
    id: Uuid,
) -> Result<(Application, ApplicationParty), AppError> {
    let app = state
        .applications
        .get(&ApplicationId::from(id))
        .ok_or_else(|| AppError::NotFound(format!("application {id} not found")))?;
    match caller.application_party(&app) {
        Some(party) => Ok((app, party)),
        None => Err(AppError::Forbidden(format!(
            "caller is not a party to application {id}"
        ))),
    }
}

/// POST /v1/applications: Start a draft application.
#[utoipa::path(
    post,
    path = "/v1/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationView),
        (status = 404, description = "Opportunity not found", body = crate::error::ErrorBody),
        (status = 409, description = "Opportunity is not accepting applications", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "applications"
)]
pub async fn create_application(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    let req = extract_validated_json(body)?;

    let applicant_id = match (caller.role.is_admin(), req.applicant_id.map(UserId::from)) {
        (false, Some(requested)) if !caller.is_user(requested) => {
            return Err(AppError::Forbidden(
                "travellers may only apply for themselves".to_string(),
            ));
        }
        (false, _) => caller
            .user_id
            .ok_or_else(|| AppError::Unauthorized("token has no user binding".to_string()))?,
        (true, Some(requested)) => requested,
        (true, None) => {
            return Err(AppError::Validation(
                "applicant_id is required when an admin creates an application".to_string(),
            ));
        }
    };

    let opportunity_id = OpportunityId::from(req.opportunity_id);
    let opp = state.opportunities.get(&opportunity_id).ok_or_else(|| {
        AppError::NotFound(format!("opportunity {} not found", req.opportunity_id))
    })?;
    if opp.status() != OpportunityStatus::Published {
        return Err(AppError::conflict(format!(
            "opportunity {} is {} and not accepting applications",
            req.opportunity_id,
            opp.status()
        )));
    }
    if opp.host_id == applicant_id {
        return Err(AppError::Validation(
            "hosts cannot apply to their own opportunity".to_string(),
        ));
    }

    let app = Application::new(opportunity_id, applicant_id, opp.host_id);
    state.applications.insert(app.id, app.clone());
    tracing::info!(
        entity = "application",
        id = %app.id,
        opportunity = %opportunity_id,
        applicant = %applicant_id,
        "application created"
    );

    Ok((StatusCode::CREATED, Json(ApplicationView::from(&app))))
}

/// GET /v1/applications/{id}: Fetch an application with its history.
#[utoipa::path(
    get,
    path = "/v1/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application found", body = ApplicationView),
        (status = 403, description = "Caller is not a party", body = crate::error::ErrorBody),
        (status = 404, description = "Application not found", body = crate::error::ErrorBody),
    ),
    tag = "applications"
)]
pub async fn get_application(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    let (app, _) = load_as_party(&state, &caller, id)?;
    Ok(Json(ApplicationView::from(&app)))
}

/// GET /v1/applications/{id}/actions: Actions the caller may take.
#[utoipa::path(
    get,
    path = "/v1/applications/{id}/actions",
    params(("id" = Uuid, Path, description = "Application ID"), ActionsQuery),
    responses(
        (status = 200, description = "Eligible actions in display order", body = ActionsResponse),
        (status = 403, description = "Caller is not a party", body = crate::error::ErrorBody),
        (status = 404, description = "Application not found", body = crate::error::ErrorBody),
    ),
    tag = "applications"
)]
pub async fn application_actions(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<ActionsResponse>, AppError> {
    let (app, party) = load_as_party(&state, &caller, id)?;
    let workflow = ApplicationStatus::workflow();
    let actions: Vec<_> = workflow
        .available_actions(app.status(), caller.role, query.include_save)
        .into_iter()
        .filter(|a| party.may_use(a))
        .collect();
    Ok(Json(actions_response(workflow, app.status(), caller.role, &actions)))
}

/// PUT /v1/applications/{id}/status: Commit a status transition.
#[utoipa::path(
    put,
    path = "/v1/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition committed", body = ApplicationView),
        (status = 403, description = "Caller may not make this transition", body = crate::error::ErrorBody),
        (status = 404, description = "Application not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition from current status", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown status or missing reason", body = crate::error::ErrorBody),
    ),
    tag = "applications"
)]
pub async fn transition_application(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<ApplicationView>, AppError> {
    match commit_transition(&state, &caller, id, body) {
        Ok((from, to, view)) => {
            metrics.record_transition();
            tracing::info!(
                entity = "application",
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
                entity = "application",
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
) -> Result<(ApplicationStatus, ApplicationStatus, ApplicationView), AppError> {
    let req = extract_validated_json(body)?;
    let target: ApplicationStatus = parse_status(&req.status)?;
    let workflow = ApplicationStatus::workflow();
    let reason = req.reason.as_deref();

    state
        .applications
        .try_update(&ApplicationId::from(id), |app| -> Result<_, AppError> {
            let party = caller.application_party(app).ok_or_else(|| {
                AppError::Forbidden(format!("caller is not a party to application {id}"))
            })?;
            let from = app.status();
            workflow.check_edge(from, target)?;
            workflow.authorize(from, target, caller.role)?;
            let permitted = workflow
                .available_actions(from, caller.role, false)
                .iter()
                .any(|a| a.target_status == Some(target) && party.may_use(a));
            if !permitted {
                return Err(AppError::Forbidden(format!(
                    "the other party decides {from} -> {target} on application {id}"
                )));
            }
            workflow.check_reason(from, target, reason)?;
            app.apply_transition(target, reason, caller.user_id)?;
            Ok((from, target, ApplicationView::from(&*app)))
        })
        .unwrap_or_else(|| Err(AppError::NotFound(format!("application {id} not found"))))
}

/// GET /v1/applications/{id}/status-reason: Latest reason for a status.
#[utoipa::path(
    get,
    path = "/v1/applications/{id}/status-reason",
    params(("id" = Uuid, Path, description = "Application ID"), StatusReasonQuery),
    responses(
        (status = 200, description = "Latest reason, or null", body = StatusReasonResponse),
        (status = 403, description = "Caller is not a party", body = crate::error::ErrorBody),
        (status = 404, description = "Application not found", body = crate::error::ErrorBody),
    ),
    tag = "applications"
)]
pub async fn application_status_reason(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusReasonQuery>,
) -> Result<Json<StatusReasonResponse>, AppError> {
    let (app, _) = load_as_party(&state, &caller, id)?;
    Ok(Json(status_reason_response(
        app.lifecycle.history(),
        &query.status,
    )))
}
