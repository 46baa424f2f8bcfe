//! Error taxonomy for the interview pipeline.
//!
//! Every variant is scoped to a single operation; none of them leaves a
//! session unusable for later calls.

use crate::difficulty::Difficulty;
use crate::generator::AttemptOutcome;
use uuid::Uuid;

/// Errors returned by the validator, generator, evaluator, store and orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum InterviewError {
    /// A call to an external generation, validation or evaluation capability failed
    /// (transport error, timeout, or an unparseable response).
    #[error("Capability call failed: {0:#}")]
    Capability(anyhow::Error),

    /// No valid question was produced within the attempt budget.
    #[error(
        "Failed to generate a valid {difficulty} question for '{tech_stack}' after {} attempts",
        attempts.len()
    )]
    GenerationExhausted {
        difficulty: Difficulty,
        tech_stack: String,
        attempts: Vec<AttemptOutcome>,
    },

    /// The question already has its one answer.
    #[error("Question {question_id} has already been answered")]
    DuplicateAnswer { question_id: i64 },

    #[error("Session '{0}' not found")]
    SessionNotFound(Uuid),

    #[error("Question {0} not found")]
    QuestionNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persistence backend failed.
    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl InterviewError {
    /// True for the errors that mean an id did not resolve to a stored row.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InterviewError::SessionNotFound(_) | InterviewError::QuestionNotFound(_)
        )
    }
}

pub type Result<T, E = InterviewError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_reports_attempt_count() {
        let err = InterviewError::GenerationExhausted {
            difficulty: Difficulty::Hard,
            tech_stack: "Rust".to_string(),
            attempts: vec![
                AttemptOutcome::Rejected {
                    reasoning: "too vague".to_string(),
                },
                AttemptOutcome::Rejected {
                    reasoning: "off topic".to_string(),
                },
                AttemptOutcome::Rejected {
                    reasoning: "duplicate".to_string(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "Failed to generate a valid Hard question for 'Rust' after 3 attempts"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(InterviewError::SessionNotFound(Uuid::nil()).is_not_found());
        assert!(InterviewError::QuestionNotFound(7).is_not_found());
        assert!(!InterviewError::DuplicateAnswer { question_id: 7 }.is_not_found());
    }

    #[test]
    fn test_capability_error_includes_context_chain() {
        let source = anyhow::anyhow!("connection reset").context("evaluate call");
        let err = InterviewError::Capability(source);
        assert_eq!(
            err.to_string(),
            "Capability call failed: evaluate call: connection reset"
        );
    }
}
