//! Interview Orchestrator
//!
//! The session-scoped controller that sequences difficulty adaptation,
//! question generation, answer evaluation and persistence. Each public method
//! maps to one operation of the API layer.
//!
//! Within a session, callers must not pose question N+1 before the answer to
//! question N has been recorded; difficulty adaptation reads the latest answer.
//! Different sessions share no mutable state and may be driven concurrently.

use crate::difficulty::{Difficulty, resolve_difficulty};
use crate::error::{InterviewError, Result};
use crate::evaluator::AnswerEvaluator;
use crate::generator::{GenerationEvent, QuestionGenerator};
use crate::scoring::Scores;
use crate::session::{
    Answer, NewAnswer, NewQuestion, NewSession, Question, QuestionWithAnswer, Session,
    SessionDetail, SessionPhase,
};
use crate::store::InterviewStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_TECH_STACK: &str = "General";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct InterviewOrchestrator {
    store: Arc<dyn InterviewStore>,
    generator: QuestionGenerator,
    evaluator: AnswerEvaluator,
}

impl InterviewOrchestrator {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        generator: QuestionGenerator,
        evaluator: AnswerEvaluator,
    ) -> Self {
        Self {
            store,
            generator,
            evaluator,
        }
    }

    /// Starts a new interview. A missing tech stack defaults to `General`;
    /// a blank one is rejected.
    pub async fn create_session(
        &self,
        difficulty: Option<Difficulty>,
        tech_stack: Option<&str>,
    ) -> Result<Session> {
        let tech_stack = tech_stack.unwrap_or(DEFAULT_TECH_STACK).trim();
        if tech_stack.is_empty() {
            return Err(InterviewError::InvalidInput(
                "tech_stack must not be blank".to_string(),
            ));
        }

        let session = self
            .store
            .create_session(NewSession {
                difficulty: difficulty.unwrap_or_default(),
                tech_stack: tech_stack.to_string(),
            })
            .await?;
        info!(session_id = %session.id, difficulty = %session.difficulty, tech_stack = %session.tech_stack, "Session created");
        Ok(session)
    }

    /// Lists sessions newest first. The page size is capped at [`MAX_PAGE_SIZE`].
    pub async fn list_sessions(&self, offset: u32, limit: Option<u32>) -> Result<Vec<Session>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        self.store.list_sessions(offset, limit).await
    }

    /// Loads a session with all of its questions and their answers.
    pub async fn get_session(&self, session_id: Uuid) -> Result<SessionDetail> {
        let session = self.load_session(session_id).await?;
        let questions = self.store.list_questions(session_id).await?;

        let mut detailed = Vec::with_capacity(questions.len());
        for question in questions {
            let answer = self.store.get_answer(question.id).await?;
            detailed.push(QuestionWithAnswer { question, answer });
        }

        Ok(SessionDetail {
            session,
            questions: detailed,
        })
    }

    pub async fn phase(&self, session_id: Uuid) -> Result<SessionPhase> {
        Ok(self.get_session(session_id).await?.phase())
    }

    /// Poses the next question of a session.
    ///
    /// A recognized `explicit_difficulty` overrides adaptation; anything else
    /// falls back to adapting from the session's latest answer. On failure
    /// nothing is written and the session is left as it was.
    pub async fn start_or_next(
        &self,
        session_id: Uuid,
        explicit_difficulty: Option<&str>,
        events: Option<&mpsc::Sender<GenerationEvent>>,
    ) -> Result<Question> {
        let session = self.load_session(session_id).await?;

        if let Some(raw) = explicit_difficulty {
            if Difficulty::from_override(raw).is_none() {
                warn!(%session_id, requested = raw, "Ignoring unrecognized difficulty override");
            }
        }

        let last_answer = self.store.latest_answer_for_session(session_id).await?;
        let difficulty = resolve_difficulty(
            explicit_difficulty,
            session.difficulty,
            last_answer.as_ref().map(|a| &a.scores),
        );

        let generated = self
            .generator
            .generate_valid_question(difficulty, &session.tech_stack, events)
            .await?;

        let question = self
            .store
            .create_question(NewQuestion {
                session_id,
                question_text: generated.question.question_text,
                difficulty: generated.question.difficulty,
                requested_difficulty: difficulty,
            })
            .await?;

        info!(
            %session_id,
            question_id = question.id,
            requested = %difficulty,
            generated = %question.difficulty,
            attempts = generated.attempts,
            "Question posed"
        );
        Ok(question)
    }

    /// Evaluates and records the one answer to a question.
    ///
    /// Scores outside `[0, 5]` are clamped, never rejected.
    pub async fn submit_answer(&self, question_id: i64, user_answer: &str) -> Result<Answer> {
        if user_answer.trim().is_empty() {
            return Err(InterviewError::InvalidInput(
                "user_answer must not be blank".to_string(),
            ));
        }

        let question = self
            .store
            .get_question(question_id)
            .await?
            .ok_or(InterviewError::QuestionNotFound(question_id))?;

        // Checked before evaluating so a repeat submission costs no capability call.
        if self.store.get_answer(question_id).await?.is_some() {
            return Err(InterviewError::DuplicateAnswer { question_id });
        }

        let session = self.load_session(question.session_id).await?;

        let evaluation = self
            .evaluator
            .evaluate(&question.question_text, user_answer, &session.tech_stack)
            .await?;

        let answer = self
            .store
            .create_answer(NewAnswer {
                question_id,
                user_answer: user_answer.to_string(),
                scores: Scores::clamped(
                    evaluation.score_correctness,
                    evaluation.score_efficiency,
                    evaluation.score_clarity,
                ),
                overall_assessment: evaluation.overall_assessment,
                feedback: evaluation.feedback,
            })
            .await?;

        info!(
            session_id = %session.id,
            question_id,
            answer_id = answer.id,
            assessment = %answer.overall_assessment,
            "Answer recorded"
        );
        Ok(answer)
    }

    async fn load_session(&self, session_id: Uuid) -> Result<Session> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(session_id))
    }
}
