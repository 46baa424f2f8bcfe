//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AnswerResponse, CreateSessionPayload, ErrorResponse, EvaluationResponse, HealthResponse,
        QuestionResponse, SessionResponse, SubmitAnswerPayload,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::create_session,
        handlers::list_sessions,
        handlers::get_session,
        handlers::generate_question,
        handlers::submit_answer,
    ),
    components(
        schemas(
            SessionResponse,
            QuestionResponse,
            AnswerResponse,
            EvaluationResponse,
            CreateSessionPayload,
            SubmitAnswerPayload,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "Interviewer API", description = "Adaptive mock technical interviews")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(handlers::health_check))
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/sessions/{id}", get(handlers::get_session))
        .route(
            "/sessions/{id}/questions",
            post(handlers::generate_question),
        )
        .route("/questions/{id}/answer", post(handlers::submit_answer))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/",
            "/sessions",
            "/sessions/{id}",
            "/sessions/{id}/questions",
            "/questions/{id}/answer",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
