use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ContactId, EmployeeId, PipelineStage};
use super::registry::{CandidateRegistry, NotificationPublisher, RegistryError};
use super::service::{CandidateOwnershipService, OwnershipError};

/// Router builder exposing the pipeline-facing ownership endpoints.
///
/// Lineup, walk-in, joining, and selection workflows mount this instead of
/// touching lock fields themselves.
pub fn ownership_router<R, N>(service: Arc<CandidateOwnershipService<R, N>>) -> Router
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/pipeline/candidates",
            post(register_handler::<R, N>),
        )
        .route(
            "/api/v1/pipeline/candidates/:contact/lock",
            get(lock_status_handler::<R, N>),
        )
        .route(
            "/api/v1/pipeline/candidates/:contact/lease",
            post(acquire_lease_handler::<R, N>),
        )
        .route(
            "/api/v1/pipeline/candidates/:contact/claim",
            post(claim_handler::<R, N>),
        )
        .route(
            "/api/v1/pipeline/maintenance/sweep",
            post(sweep_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub contact_id: String,
    pub employee_id: String,
    /// Stage already reached at registration time; stages carrying a lock
    /// window arm it in the same request.
    #[serde(default)]
    pub stage: Option<PipelineStage>,
    /// Event-time override for replays and demos; defaults to now.
    #[serde(default)]
    pub effective_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LeaseRequest {
    pub employee_id: String,
    pub stage: PipelineStage,
    #[serde(default)]
    pub effective_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub employee_id: String,
    #[serde(default)]
    pub effective_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LockQuery {
    #[serde(default)]
    pub effective_at: Option<DateTime<Utc>>,
}

pub(crate) async fn register_handler<R, N>(
    State(service): State<Arc<CandidateOwnershipService<R, N>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    let now = request.effective_at.unwrap_or_else(Utc::now);
    let contact = ContactId(request.contact_id);
    let employee = EmployeeId(request.employee_id);

    let created = match service.create(contact.clone(), employee.clone(), now) {
        Ok(candidate) => candidate,
        Err(err) => return error_response(err),
    };

    let candidate = match request.stage {
        Some(stage) => match service.acquire_lease(&contact, employee, stage, now) {
            Ok(grant) => grant.candidate,
            Err(err) => return error_response(err),
        },
        None => created,
    };

    (
        StatusCode::CREATED,
        axum::Json(json!({ "candidate": candidate.view(now) })),
    )
        .into_response()
}

pub(crate) async fn lock_status_handler<R, N>(
    State(service): State<Arc<CandidateOwnershipService<R, N>>>,
    Path(contact): Path<String>,
    axum::extract::Query(query): axum::extract::Query<LockQuery>,
) -> Response
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    let now = query.effective_at.unwrap_or_else(Utc::now);
    match service.check_lock(&ContactId(contact), now) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn acquire_lease_handler<R, N>(
    State(service): State<Arc<CandidateOwnershipService<R, N>>>,
    Path(contact): Path<String>,
    axum::Json(request): axum::Json<LeaseRequest>,
) -> Response
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    let now = request.effective_at.unwrap_or_else(Utc::now);
    let contact = ContactId(contact);
    match service.acquire_lease(&contact, EmployeeId(request.employee_id), request.stage, now) {
        Ok(grant) => (
            StatusCode::OK,
            axum::Json(json!({
                "candidate": grant.candidate.view(now),
                "previous_owner_id": grant.previous_owner,
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn claim_handler<R, N>(
    State(service): State<Arc<CandidateOwnershipService<R, N>>>,
    Path(contact): Path<String>,
    axum::Json(request): axum::Json<ClaimRequest>,
) -> Response
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    let now = request.effective_at.unwrap_or_else(Utc::now);
    let contact = ContactId(contact);
    match service.transfer_ownership(&contact, EmployeeId(request.employee_id), now) {
        Ok(transfer) => (
            StatusCode::OK,
            axum::Json(json!({
                "candidate": transfer.candidate.view(now),
                "previous_owner_id": transfer.previous_owner,
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sweep_handler<R, N>(
    State(service): State<Arc<CandidateOwnershipService<R, N>>>,
) -> Response
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    match service.registry().clear_expired_locks(Utc::now()) {
        Ok(cleared) => (StatusCode::OK, axum::Json(json!({ "cleared": cleared }))).into_response(),
        Err(err) => error_response(OwnershipError::Registry(err)),
    }
}

fn error_response(err: OwnershipError) -> Response {
    let status = match &err {
        OwnershipError::DuplicateCandidate { .. } | OwnershipError::AlreadyOwned(_) => {
            StatusCode::CONFLICT
        }
        OwnershipError::LockedByOther { .. } => StatusCode::LOCKED,
        OwnershipError::NotFound(_) => StatusCode::NOT_FOUND,
        OwnershipError::Registry(RegistryError::StaleWrite) => StatusCode::CONFLICT,
        OwnershipError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut payload = json!({
        "code": err.code(),
        "error": err.to_string(),
    });
    if let OwnershipError::LockedByOther { owner, expires } = &err {
        payload["locked_by"] = json!(owner);
        payload["lock_expiry"] = json!(expires);
    }
    if let OwnershipError::DuplicateCandidate { owner: Some(owner), .. } = &err {
        payload["owner_id"] = json!(owner);
    }

    (status, axum::Json(payload)).into_response()
}
