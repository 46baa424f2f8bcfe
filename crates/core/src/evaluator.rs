use crate::capability::{AnswerEvaluation, RawEvaluation};
use crate::error::{InterviewError, Result};
use anyhow::anyhow;
use std::sync::Arc;
use tracing::info;

/// Scores a candidate's answer through the injected evaluation capability.
///
/// A single call with no retry. Scores are passed through unclamped; the
/// orchestrator clamps them when it records the answer.
#[derive(Clone)]
pub struct AnswerEvaluator {
    capability: Arc<dyn AnswerEvaluation>,
}

impl AnswerEvaluator {
    pub fn new(capability: Arc<dyn AnswerEvaluation>) -> Self {
        Self { capability }
    }

    pub async fn evaluate(
        &self,
        question_text: &str,
        user_answer: &str,
        tech_stack: &str,
    ) -> Result<RawEvaluation> {
        let evaluation = self
            .capability
            .evaluate(question_text, user_answer, tech_stack)
            .await
            .map_err(InterviewError::Capability)?;

        if evaluation.feedback.trim().is_empty() {
            return Err(InterviewError::Capability(anyhow!(
                "Evaluation response is missing feedback"
            )));
        }

        info!(
            correctness = evaluation.score_correctness,
            efficiency = evaluation.score_efficiency,
            clarity = evaluation.score_clarity,
            assessment = %evaluation.overall_assessment,
            "Answer evaluated"
        );
        Ok(evaluation)
    }
}
