//! # Authentication & Authorization
//!
//! Bearer token middleware and the caller-identity checks the transition
//! endpoints run before committing anything.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   role-scoped caller
//! Bearer {secret}                    bare secret, treated as SUPER_ADMIN
//! ```
//!
//! `user_id` may be empty for admin tokens. The secret is compared in
//! constant time. When no secret is configured, authentication is disabled
//! and every request runs as an unbound `SUPER_ADMIN`.
//!
//! An unbound `SUPER_ADMIN` is offered only what the catalog gives admins.
//! Host-only moves such as submitting a draft listing for review stay out
//! of reach in that mode. Use role-scoped tokens to exercise host flows.
//!
//! ## Ownership
//!
//! The action catalog decides what a *role* may do. Ownership decides which
//! *records* a caller may do it to: hosts manage their own listings and the
//! applications to them, travellers manage their own applications, admins
//! manage everything.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use twx_core::{Role, UserId};
use twx_state::{ActionDescriptor, Application, Opportunity};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller, injected by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// The caller's user ID. `None` for unbound admin tokens.
    pub user_id: Option<UserId>,
}

/// How a caller relates to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationParty {
    /// Administrative access.
    Admin,
    /// Host of the opportunity applied to.
    Host,
    /// The traveller who applied.
    Applicant,
}

impl ApplicationParty {
    /// Whether this party may invoke `action`. Hosts decide; applicants
    /// submit and withdraw.
    pub fn may_use<S>(&self, action: &ActionDescriptor<S>) -> bool {
        match self {
            Self::Admin => true,
            Self::Host => action.host_only,
            Self::Applicant => !action.host_only,
        }
    }
}

impl CallerIdentity {
    /// An unbound super-admin, used when authentication is disabled.
    pub fn super_admin() -> Self {
        Self {
            role: Role::SuperAdmin,
            user_id: None,
        }
    }

    /// Whether the caller is `user`.
    pub fn is_user(&self, user: UserId) -> bool {
        self.user_id == Some(user)
    }

    /// Whether the caller may change `opportunity`'s status.
    pub fn can_manage_opportunity(&self, opportunity: &Opportunity) -> bool {
        self.role.is_admin() || (self.role.is_host() && self.is_user(opportunity.host_id))
    }

    /// Whether the caller may read `opportunity`. Public listings are
    /// readable by anyone.
    pub fn can_view_opportunity(&self, opportunity: &Opportunity) -> bool {
        opportunity.status().is_public()
            || self.role.is_admin()
            || self.is_user(opportunity.host_id)
    }

    /// The caller's relationship to `application`, if any.
    pub fn application_party(&self, application: &Application) -> Option<ApplicationParty> {
        if self.role.is_admin() {
            Some(ApplicationParty::Admin)
        } else if self.is_user(application.applicant_id) {
            Some(ApplicationParty::Applicant)
        } else if self.role.is_host() && self.is_user(application.host_id) {
            Some(ApplicationParty::Host)
        } else {
            None
        }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller holds one of `allowed`.
pub fn require_role(caller: &CallerIdentity, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&caller.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role {} may not perform this operation",
            caller.role
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets. A length mismatch still
/// performs a comparison so timing does not reveal the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token of the form `{role}:{user_id}:{secret}` or
/// `{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                Ok(CallerIdentity::super_admin())
            } else {
                Err("invalid bearer token".into())
            }
        }
        [role, user, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role: Role = role.parse().map_err(|e| format!("{e}"))?;

            let user_id = if user.is_empty() {
                None
            } else {
                Some(
                    user.parse::<UserId>()
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                )
            };

            if user_id.is_none() && !role.is_admin() {
                return Err(format!("role {role} requires a user_id"));
            }

            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format: expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer token and inject the caller's [`CallerIdentity`].
///
/// When `AuthConfig.token` is `None`, every request runs as an unbound
/// `SUPER_ADMIN`.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header.map(|h| h.strip_prefix("Bearer ")) {
                Some(Some(provided)) => match parse_bearer_token(provided, expected) {
                    Ok(identity) => {
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(msg) => {
                        tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                        unauthorized_response(&msg)
                    }
                },
                Some(None) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            request.extensions_mut().insert(CallerIdentity::super_admin());
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use twx_core::OpportunityId;
    use twx_state::OpportunityStatus;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn test_app(token: Option<String>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move { caller.role.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token }))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn host(user: UserId) -> CallerIdentity {
        CallerIdentity {
            role: Role::Host,
            user_id: Some(user),
        }
    }

    // ── Middleware ───────────────────────────────────────────────

    #[tokio::test]
    async fn scoped_token_injects_role() {
        let app = test_app(Some("s3cret".into()));
        let (status, body) = call(app, Some(&format!("Bearer host:{USER_ID}:s3cret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "HOST");
    }

    #[tokio::test]
    async fn bare_secret_is_super_admin() {
        let (status, body) = call(test_app(Some("s3cret".into())), Some("Bearer s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "SUPER_ADMIN");
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let (status, body) = call(test_app(Some("s3cret".into())), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let app = test_app(Some("s3cret".into()));
        let (status, _) = call(app, Some(&format!("Bearer host:{USER_ID}:guess"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(test_app(Some("s3cret".into())), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn auth_disabled_runs_as_super_admin() {
        let (status, body) = call(test_app(None), Some("Bearer anything")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "SUPER_ADMIN");
    }

    // ── Token parsing ────────────────────────────────────────────

    #[test]
    fn parse_lowercase_roles() {
        let id = parse_bearer_token(&format!("super_admin:{USER_ID}:k"), "k").unwrap();
        assert_eq!(id.role, Role::SuperAdmin);
        assert_eq!(id.user_id.unwrap().as_uuid().to_string(), USER_ID);
    }

    #[test]
    fn admin_token_may_omit_user() {
        let id = parse_bearer_token("admin::k", "k").unwrap();
        assert_eq!(id.role, Role::Admin);
        assert!(id.user_id.is_none());
    }

    #[test]
    fn host_token_requires_user() {
        let err = parse_bearer_token("host::k", "k").unwrap_err();
        assert!(err.contains("requires a user_id"));
    }

    #[test]
    fn unknown_role_rejected() {
        let err = parse_bearer_token(&format!("guest:{USER_ID}:k"), "k").unwrap_err();
        assert!(err.contains("unknown role"));
    }

    #[test]
    fn bad_user_id_rejected() {
        let err = parse_bearer_token("user:not-a-uuid:k", "k").unwrap_err();
        assert!(err.contains("invalid user_id"));
    }

    #[test]
    fn two_part_token_rejected() {
        assert!(parse_bearer_token("host:k", "k").is_err());
    }

    #[test]
    fn constant_time_eq_behaviour() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abd", "abc"));
        assert!(!constant_time_token_eq("ab", "abc"));
        assert!(!constant_time_token_eq("", "abc"));
    }

    // ── Ownership ────────────────────────────────────────────────

    #[test]
    fn host_manages_only_own_opportunity() {
        let owner = UserId::new();
        let opp = Opportunity::new(owner, "Farm stay in Taichung");
        assert!(host(owner).can_manage_opportunity(&opp));
        assert!(!host(UserId::new()).can_manage_opportunity(&opp));
        assert!(CallerIdentity::super_admin().can_manage_opportunity(&opp));
        let traveller = CallerIdentity {
            role: Role::User,
            user_id: Some(owner),
        };
        assert!(!traveller.can_manage_opportunity(&opp));
    }

    #[test]
    fn draft_opportunity_hidden_from_strangers() {
        let owner = UserId::new();
        let mut opp = Opportunity::new(owner, "Guesthouse in Kenting");
        let stranger = CallerIdentity {
            role: Role::User,
            user_id: Some(UserId::new()),
        };
        assert!(!stranger.can_view_opportunity(&opp));
        assert!(host(owner).can_view_opportunity(&opp));
        opp.apply_transition(OpportunityStatus::Pending, None, None).unwrap();
        opp.apply_transition(OpportunityStatus::Published, None, None).unwrap();
        assert!(stranger.can_view_opportunity(&opp));
    }

    #[test]
    fn application_parties() {
        let applicant = UserId::new();
        let owner = UserId::new();
        let app = Application::new(OpportunityId::new(), applicant, owner);
        let traveller = CallerIdentity {
            role: Role::User,
            user_id: Some(applicant),
        };
        assert_eq!(traveller.application_party(&app), Some(ApplicationParty::Applicant));
        assert_eq!(host(owner).application_party(&app), Some(ApplicationParty::Host));
        assert_eq!(host(UserId::new()).application_party(&app), None);
        assert_eq!(
            CallerIdentity::super_admin().application_party(&app),
            Some(ApplicationParty::Admin)
        );
    }

    #[test]
    fn host_party_uses_only_host_actions() {
        let accept =
            ActionDescriptor::transition("Accept", twx_state::ApplicationStatus::Accepted).host_only();
        let withdraw = ActionDescriptor {
            host_only: false,
            ..accept.clone()
        };
        assert!(ApplicationParty::Host.may_use(&accept));
        assert!(!ApplicationParty::Host.may_use(&withdraw));
        assert!(ApplicationParty::Applicant.may_use(&withdraw));
        assert!(!ApplicationParty::Applicant.may_use(&accept));
        assert!(ApplicationParty::Admin.may_use(&accept));
    }

    #[test]
    fn require_role_checks_membership() {
        assert!(require_role(&host(UserId::new()), &[Role::Host, Role::Admin]).is_ok());
        assert!(require_role(&host(UserId::new()), &[Role::User]).is_err());
    }
}
