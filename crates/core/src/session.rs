use crate::capability::OverallAssessment;
use crate::difficulty::Difficulty;
use crate::scoring::Scores;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One interview run, scoped to a tech stack and an evolving difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// The difficulty most recently used to generate a question.
    pub difficulty: Difficulty,
    /// Fixed at creation and passed unchanged into every capability call.
    pub tech_stack: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub session_id: Uuid,
    pub question_text: String,
    /// The difficulty the question was actually generated at.
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub scores: Scores,
    pub overall_assessment: OverallAssessment,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub difficulty: Difficulty,
    pub tech_stack: String,
}

/// A validated question ready to be recorded.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub session_id: Uuid,
    pub question_text: String,
    pub difficulty: Difficulty,
    /// Stored as the session's current difficulty in the same write.
    pub requested_difficulty: Difficulty,
}

/// An evaluated answer ready to be recorded. Scores are already clamped.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: i64,
    pub user_answer: String,
    pub scores: Scores,
    pub overall_assessment: OverallAssessment,
    pub feedback: String,
}

/// Where a session sits in the ask/answer loop. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    NoQuestion,
    QuestionPosed,
    Answered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionWithAnswer {
    #[serde(flatten)]
    pub question: Question,
    pub answer: Option<Answer>,
}

/// A session together with its questions, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    pub questions: Vec<QuestionWithAnswer>,
}

impl SessionDetail {
    pub fn phase(&self) -> SessionPhase {
        match self.questions.last() {
            None => SessionPhase::NoQuestion,
            Some(q) if q.answer.is_some() => SessionPhase::Answered,
            Some(_) => SessionPhase::QuestionPosed,
        }
    }
}
