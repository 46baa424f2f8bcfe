use crate::capability::{QuestionValidation, ValidationVerdict};
use crate::error::{InterviewError, Result};
use std::sync::Arc;
use tracing::debug;

/// Quality gate applied to a freshly generated question.
///
/// Delegates to the injected validation capability. It never retries; the
/// generator owns the retry budget.
#[derive(Clone)]
pub struct QuestionValidator {
    capability: Arc<dyn QuestionValidation>,
}

impl QuestionValidator {
    pub fn new(capability: Arc<dyn QuestionValidation>) -> Self {
        Self { capability }
    }

    pub async fn validate(&self, question_text: &str, tech_stack: &str) -> Result<ValidationVerdict> {
        let verdict = self
            .capability
            .validate(question_text, tech_stack)
            .await
            .map_err(InterviewError::Capability)?;
        debug!(is_valid = verdict.is_valid, reasoning = %verdict.reasoning, "Question validated");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedValidator, verdict};

    #[tokio::test]
    async fn test_validate_passes_verdict_through() {
        let fake = Arc::new(ScriptedValidator::new(vec![Ok(verdict(false, "too vague"))]));
        let validator = QuestionValidator::new(fake.clone());

        let result = validator.validate("What is Python?", "Python").await.unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.reasoning, "too vague");
        assert_eq!(
            fake.calls(),
            vec![("What is Python?".to_string(), "Python".to_string())]
        );
    }

    #[tokio::test]
    async fn test_validate_propagates_capability_failure() {
        let fake = Arc::new(ScriptedValidator::new(vec![Err("timeout".to_string())]));
        let validator = QuestionValidator::new(fake.clone());

        let err = validator.validate("Q", "Rust").await.unwrap_err();

        assert!(matches!(err, InterviewError::Capability(_)));
        assert_eq!(fake.calls().len(), 1);
    }
}
