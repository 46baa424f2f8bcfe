//! API Models
//!
//! Request payloads and response bodies of the REST API, with `utoipa`
//! schemas for the OpenAPI document. Responses are built from the core
//! domain types.

use chrono::{DateTime, Utc};
use interviewer_core::session::{Answer, Question, Session, SessionDetail};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Default)]
pub struct CreateSessionPayload {
    /// Starting difficulty (case-insensitive); defaults to `Medium`.
    #[schema(example = "Medium")]
    pub difficulty: Option<String>,
    /// Defaults to `General`.
    #[schema(example = "Python")]
    pub tech_stack: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitAnswerPayload {
    #[schema(example = "A closure captures variables from its enclosing scope.")]
    pub user_answer: String,
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ListSessionsQuery {
    /// Number of sessions to skip.
    pub skip: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct NextQuestionQuery {
    /// Forces a difficulty (case-insensitive). Unrecognized values are ignored.
    pub difficulty: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct QuestionResponse {
    pub id: i64,
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    pub question_text: String,
    #[schema(example = "Medium")]
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
    pub answered: bool,
    /// The recorded answer with its evaluation, once submitted.
    pub answer: Option<AnswerResponse>,
}

impl QuestionResponse {
    pub fn new(question: Question, answer: Option<Answer>) -> Self {
        Self {
            id: question.id,
            session_id: question.session_id,
            question_text: question.question_text,
            difficulty: question.difficulty.to_string(),
            created_at: question.created_at,
            answered: answer.is_some(),
            answer: answer.map(AnswerResponse::from),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[schema(example = "Medium")]
    pub difficulty: String,
    #[schema(example = "Python")]
    pub tech_stack: String,
    pub questions: Vec<QuestionResponse>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            difficulty: session.difficulty.to_string(),
            tech_stack: session.tech_stack,
            questions: Vec::new(),
        }
    }
}

impl From<SessionDetail> for SessionResponse {
    fn from(detail: SessionDetail) -> Self {
        let questions = detail
            .questions
            .into_iter()
            .map(|q| QuestionResponse::new(q.question, q.answer))
            .collect();
        Self {
            questions,
            ..SessionResponse::from(detail.session)
        }
    }
}

/// The evaluation as shown to the candidate. Scores are already clamped to `[0, 5]`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct EvaluationResponse {
    pub score_correctness: Option<u8>,
    pub score_efficiency: Option<u8>,
    pub score_clarity: Option<u8>,
    pub feedback: String,
    #[schema(example = "Good")]
    pub overall_assessment: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct AnswerResponse {
    pub id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub feedback_json: EvaluationResponse,
    pub created_at: DateTime<Utc>,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            user_answer: answer.user_answer,
            feedback_json: EvaluationResponse {
                score_correctness: answer.scores.correctness,
                score_efficiency: answer.scores.efficiency,
                score_clarity: answer.scores.clarity,
                feedback: answer.feedback,
                overall_assessment: answer.overall_assessment.to_string(),
            },
            created_at: answer.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use interviewer_core::{
        capability::OverallAssessment, difficulty::Difficulty, scoring::Scores,
        session::QuestionWithAnswer,
    };

    fn question(id: i64, session_id: Uuid) -> Question {
        Question {
            id,
            session_id,
            question_text: format!("Question {}", id),
            difficulty: Difficulty::Hard,
            created_at: Utc::now(),
        }
    }

    fn answer(question_id: i64) -> Answer {
        Answer {
            id: 3,
            question_id,
            user_answer: "Use a B-tree index.".to_string(),
            scores: Scores::clamped(4, 7, -2),
            overall_assessment: OverallAssessment::NeedsImprovement,
            feedback: "Mention write amplification.".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_session_payload_fields_are_optional() {
        let payload: CreateSessionPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.difficulty.is_none());
        assert!(payload.tech_stack.is_none());

        let payload: CreateSessionPayload =
            serde_json::from_str(r#"{"difficulty": "Hard", "tech_stack": "Go"}"#).unwrap();
        assert_eq!(payload.difficulty.as_deref(), Some("Hard"));
        assert_eq!(payload.tech_stack.as_deref(), Some("Go"));
    }

    #[test]
    fn test_submit_answer_payload_requires_answer() {
        assert!(serde_json::from_str::<SubmitAnswerPayload>("{}").is_err());
        let payload: SubmitAnswerPayload =
            serde_json::from_str(r#"{"question_id": 4, "user_answer": "Yes"}"#).unwrap();
        assert_eq!(payload.user_answer, "Yes");
    }

    #[test]
    fn test_session_response_from_detail_includes_answers() {
        let session_id = Uuid::new_v4();
        let detail = SessionDetail {
            session: Session {
                id: session_id,
                created_at: Utc::now(),
                difficulty: Difficulty::Hard,
                tech_stack: "Postgres".to_string(),
            },
            questions: vec![
                QuestionWithAnswer {
                    question: question(1, session_id),
                    answer: Some(answer(1)),
                },
                QuestionWithAnswer {
                    question: question(2, session_id),
                    answer: None,
                },
            ],
        };

        let response = SessionResponse::from(detail);

        assert_eq!(response.difficulty, "Hard");
        assert_eq!(response.tech_stack, "Postgres");
        assert_eq!(response.questions.len(), 2);
        assert!(response.questions[0].answered);
        assert!(!response.questions[1].answered);

        let answer = response.questions[0].answer.as_ref().unwrap();
        assert_eq!(answer.question_id, 1);
        assert_eq!(answer.user_answer, "Use a B-tree index.");
        assert_eq!(answer.feedback_json.score_correctness, Some(4));
        assert_eq!(answer.feedback_json.score_efficiency, Some(5));
        assert_eq!(answer.feedback_json.score_clarity, Some(0));
        assert_eq!(answer.feedback_json.feedback, "Mention write amplification.");
        assert_eq!(answer.feedback_json.overall_assessment, "Needs Improvement");
        assert!(response.questions[1].answer.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["questions"][1]["answer"].is_null());
    }

    #[test]
    fn test_answer_response_serialization() {
        let json = serde_json::to_value(AnswerResponse::from(answer(9))).unwrap();

        assert_eq!(json["question_id"], 9);
        assert_eq!(json["feedback_json"]["score_correctness"], 4);
        assert_eq!(json["feedback_json"]["score_efficiency"], 5);
        assert_eq!(json["feedback_json"]["score_clarity"], 0);
        assert_eq!(json["feedback_json"]["overall_assessment"], "Needs Improvement");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Session not found".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"Session not found"}"#);
    }
}
