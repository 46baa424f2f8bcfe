//! Axum Handlers for the REST API
//!
//! Each handler maps to one orchestrator operation. It uses `utoipa` doc
//! comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use interviewer_core::{InterviewError, difficulty::Difficulty};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    models::{
        AnswerResponse, CreateSessionPayload, ErrorResponse, HealthResponse, ListSessionsQuery,
        NextQuestionQuery, QuestionResponse, SessionResponse, SubmitAnswerPayload,
    },
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// Question generation spent all its attempts.
    Exhausted(String),
    /// An upstream capability call failed.
    Upstream(String),
    InternalServerError(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Exhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Exhausted(message) => message,
            ApiError::Upstream(message) => {
                warn!("Upstream capability failure: {}", message);
                "The language model service failed to respond. Please try again.".to_string()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                "An internal server error occurred.".to_string()
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<InterviewError> for ApiError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::SessionNotFound(_) | InterviewError::QuestionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            InterviewError::DuplicateAnswer { .. } => ApiError::Conflict(err.to_string()),
            InterviewError::InvalidInput(message) => ApiError::BadRequest(message),
            InterviewError::GenerationExhausted { ref attempts, .. } => {
                let reasons = attempts
                    .iter()
                    .enumerate()
                    .map(|(i, outcome)| format!("attempt {}: {}", i + 1, outcome))
                    .collect::<Vec<_>>()
                    .join("; ");
                ApiError::Exhausted(format!(
                    "{} ({}). Please try again with different parameters.",
                    err, reasons
                ))
            }
            InterviewError::Capability(_) => ApiError::Upstream(err.to_string()),
            InterviewError::Storage(source) => ApiError::InternalServerError(source),
        }
    }
}

/// Health check.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "AI Interviewer API is running".to_string(),
    })
}

/// Create a new interview session.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Session created successfully", body = SessionResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let difficulty = payload
        .difficulty
        .as_deref()
        .map(|raw| {
            Difficulty::from_override(raw).ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "'{}' is not a recognized difficulty (expected Easy, Medium or Hard)",
                    raw
                ))
            })
        })
        .transpose()?;

    let session = state
        .orchestrator
        .create_session(difficulty, payload.tech_stack.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// List sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    params(ListSessionsQuery),
    responses(
        (status = 200, description = "List of sessions", body = [SessionResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state
        .orchestrator
        .list_sessions(query.skip.unwrap_or(0), query.limit)
        .await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Get a session with its questions.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session with each question and its evaluated answer", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let detail = state.orchestrator.get_session(id).await?;
    Ok(Json(detail.into()))
}

/// Generate the next question for a session.
///
/// The difficulty adapts to the latest answer unless a recognized
/// `difficulty` query parameter forces one.
#[utoipa::path(
    post,
    path = "/sessions/{id}/questions",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        NextQuestionQuery
    ),
    responses(
        (status = 200, description = "A validated question", body = QuestionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "No valid question after all attempts", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn generate_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<NextQuestionQuery>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = state
        .orchestrator
        .start_or_next(id, query.difficulty.as_deref(), None)
        .await?;
    Ok(Json(QuestionResponse::new(question, None)))
}

/// Submit the answer to a question and receive its evaluation.
#[utoipa::path(
    post,
    path = "/questions/{id}/answer",
    request_body = SubmitAnswerPayload,
    params(
        ("id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "The evaluated answer", body = AnswerResponse),
        (status = 400, description = "Blank answer", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 409, description = "Question already answered", body = ErrorResponse),
        (status = 502, description = "Evaluation service failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAnswerPayload>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = state
        .orchestrator
        .submit_answer(id, &payload.user_answer)
        .await?;
    Ok(Json(answer.into()))
}
