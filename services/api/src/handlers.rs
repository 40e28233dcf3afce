//! Axum Handlers for the REST API
//!
//! Each interview operation maps to one endpoint. Sessions are scoped to the
//! caller's `x-user-id` header. A generation failure is reported as
//! `502 Bad Gateway` so the client can show an explicit failure state instead
//! of silently continuing the conversation.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use interview_core::{InterviewError, InterviewOrchestrator, NotFoundError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    models::{
        AnswerPayload, CatalogView, CreateSessionPayload, ErrorResponse, FeedbackResponse,
        HealthResponse, SessionView, TextResponse,
    },
    sessions::Session,
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                error!("Generation failed: {}", message);
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<InterviewError> for ApiError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::NotFound(e) => e.into(),
            InterviewError::Generation(e) => Self::BadGateway(e.to_string()),
        }
    }
}

fn user_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("x-user-id header is required".to_string()))
}

async fn find_session(
    state: &AppState,
    headers: &HeaderMap,
    id: Uuid,
) -> Result<Arc<Session>, ApiError> {
    let user_id = user_id(headers)?;
    state
        .sessions
        .get(id, user_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))
}

fn require_answer(payload: &AnswerPayload) -> Result<&str, ApiError> {
    let answer = payload.answer.trim();
    if answer.is_empty() {
        return Err(ApiError::BadRequest("answer must not be empty".to_string()));
    }
    Ok(answer)
}

async fn view(session: &Session) -> SessionView {
    let orchestrator = session.orchestrator.lock().await;
    SessionView::new(session.id, orchestrator.state(), orchestrator.context())
}

/// Liveness probe; also reports the configured generation backend.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: state.config.generator.provider.to_string(),
        model: state.config.generator.model.clone(),
    })
}

/// List the roles, their domains, and the personas an interview can use.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Available roles and personas", body = CatalogView))
)]
pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogView>, ApiError> {
    let mut roles = BTreeMap::new();
    for role in state.profiles.role_ids() {
        roles.insert(role.to_string(), state.profiles.role_domains(role)?.to_vec());
    }
    let personas = state.profiles.persona_ids().map(String::from).collect();
    Ok(Json(CatalogView { roles, personas }))
}

/// Start a new interview session with the given profile.
///
/// An unknown domain falls back to the role's first domain; an unknown role
/// is rejected.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Session created successfully", body = SessionView),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Unknown role", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user creating the session")
    )
)]
#[instrument(skip_all, fields(role = %payload.role))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user_id(&headers)?;
    for (field, value) in [
        ("role", &payload.role),
        ("seniority", &payload.seniority),
        ("domain", &payload.domain),
        ("persona", &payload.persona),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("{field} must not be empty")));
        }
    }

    let mut orchestrator =
        InterviewOrchestrator::new(state.profiles.clone(), state.generator.clone());
    orchestrator.set_profile(
        &payload.role,
        &payload.seniority,
        &payload.domain,
        &payload.persona,
    )?;

    let session = state.sessions.insert(user_id, orchestrator).await;
    info!(session_id = %session.id, "Interview session created");

    Ok((StatusCode::CREATED, Json(view(&session).await)))
}

/// List all sessions for a user.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "List of sessions", body = [SessionView]),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let user_id = user_id(&headers)?;
    let mut views = Vec::new();
    for session in state.sessions.list(user_id).await {
        views.push(view(&session).await);
    }
    Ok(Json(views))
}

/// Get a specific session, including its answers and feedback so far.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &headers, id).await?;
    Ok(Json(view(&session).await))
}

/// End and discard a session.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = user_id(&headers)?;
    if state.sessions.remove(id, user_id).await {
        info!(session_id = %id, "Interview session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session with id '{}' not found", id)))
    }
}

/// Ask the next interview question.
#[utoipa::path(
    post,
    path = "/sessions/{id}/question",
    responses(
        (status = 200, description = "The next question", body = TextResponse),
        (status = 404, description = "Session or persona not found", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
#[instrument(skip_all, fields(session_id = %id))]
pub async fn next_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<TextResponse>, ApiError> {
    let session = find_session(&state, &headers, id).await?;
    let mut orchestrator = session.orchestrator.lock().await;
    let text = orchestrator.next_question().await?;
    Ok(Json(TextResponse {
        text,
        state: orchestrator.state().into(),
    }))
}

/// Submit an answer and get a follow-up question.
#[utoipa::path(
    post,
    path = "/sessions/{id}/followup",
    request_body = AnswerPayload,
    responses(
        (status = 200, description = "The follow-up question", body = TextResponse),
        (status = 400, description = "Empty answer", body = ErrorResponse),
        (status = 404, description = "Session or persona not found", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
#[instrument(skip_all, fields(session_id = %id))]
pub async fn followup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerPayload>,
) -> Result<Json<TextResponse>, ApiError> {
    let answer = require_answer(&payload)?;
    let session = find_session(&state, &headers, id).await?;
    let mut orchestrator = session.orchestrator.lock().await;
    let text = orchestrator.followup(answer).await?;
    Ok(Json(TextResponse {
        text,
        state: orchestrator.state().into(),
    }))
}

/// Score an answer against the rubric.
#[utoipa::path(
    post,
    path = "/sessions/{id}/feedback",
    request_body = AnswerPayload,
    responses(
        (status = 200, description = "Structured feedback", body = FeedbackResponse),
        (status = 400, description = "Empty answer", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
#[instrument(skip_all, fields(session_id = %id))]
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerPayload>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let answer = require_answer(&payload)?;
    let session = find_session(&state, &headers, id).await?;
    let mut orchestrator = session.orchestrator.lock().await;
    let record = orchestrator.feedback(answer).await?;
    Ok(Json(FeedbackResponse {
        feedback: record.into(),
        state: orchestrator.state().into(),
    }))
}

/// Close the interview with a summary.
#[utoipa::path(
    post,
    path = "/sessions/{id}/summary",
    responses(
        (status = 200, description = "The session summary", body = TextResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
#[instrument(skip_all, fields(session_id = %id))]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<TextResponse>, ApiError> {
    let session = find_session(&state, &headers, id).await?;
    let mut orchestrator = session.orchestrator.lock().await;
    let text = orchestrator.summary().await?;
    Ok(Json(TextResponse {
        text,
        state: orchestrator.state().into(),
    }))
}
