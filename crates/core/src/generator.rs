//! Question Generation Service
//!
//! Pairs the generation capability with the validator in a bounded loop: each
//! round generates one candidate and validates it, and the first accepted
//! candidate wins. Rejections and capability failures are recorded as tagged
//! attempt outcomes, published to an optional event channel, and never abort
//! the loop early.

use crate::capability::{GeneratedQuestion, QuestionGeneration};
use crate::difficulty::Difficulty;
use crate::error::{InterviewError, Result};
use crate::validator::QuestionValidator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Maximum number of generate-then-validate rounds per request.
pub const MAX_ATTEMPTS: u32 = 3;

/// Which capability call failed within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapabilityStage {
    Generate,
    Validate,
}

/// What happened in a single generate-then-validate round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted,
    /// The validator judged the candidate unfit.
    Rejected { reasoning: String },
    /// A capability call errored (transport, timeout, malformed output).
    CapabilityFailed {
        stage: CapabilityStage,
        message: String,
    },
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Accepted => f.write_str("accepted"),
            AttemptOutcome::Rejected { reasoning } => write!(f, "rejected: {}", reasoning),
            AttemptOutcome::CapabilityFailed { stage, message } => {
                let stage = match stage {
                    CapabilityStage::Generate => "generation",
                    CapabilityStage::Validate => "validation",
                };
                write!(f, "{} failed: {}", stage, message)
            }
        }
    }
}

/// Progress events published while a question is being produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationEvent {
    /// 1-based round number.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSuccess {
    pub question: GeneratedQuestion,
    /// Number of rounds used, including the accepted one.
    pub attempts: u32,
}

#[derive(Clone)]
pub struct QuestionGenerator {
    capability: Arc<dyn QuestionGeneration>,
    validator: QuestionValidator,
}

impl QuestionGenerator {
    pub fn new(capability: Arc<dyn QuestionGeneration>, validator: QuestionValidator) -> Self {
        Self {
            capability,
            validator,
        }
    }

    /// Produces a validated question, trying at most [`MAX_ATTEMPTS`] rounds.
    ///
    /// Persists nothing. Fails with [`InterviewError::GenerationExhausted`]
    /// carrying every round's outcome when no candidate is accepted.
    pub async fn generate_valid_question(
        &self,
        difficulty: Difficulty,
        tech_stack: &str,
        events: Option<&mpsc::Sender<GenerationEvent>>,
    ) -> Result<GenerationSuccess> {
        let mut outcomes = Vec::with_capacity(MAX_ATTEMPTS as usize);

        for attempt in 1..=MAX_ATTEMPTS {
            let (outcome, candidate) = self.run_round(difficulty, tech_stack).await;

            match &outcome {
                AttemptOutcome::Accepted => {
                    info!(attempt, %difficulty, tech_stack, "Generated question accepted");
                }
                AttemptOutcome::Rejected { reasoning } => {
                    warn!(attempt, %difficulty, tech_stack, %reasoning, "Generated question rejected, retrying");
                }
                AttemptOutcome::CapabilityFailed { stage, message } => {
                    warn!(attempt, ?stage, error = %message, "Capability call failed during question generation");
                }
            }

            if let Some(tx) = events {
                let event = GenerationEvent {
                    attempt,
                    outcome: outcome.clone(),
                };
                if tx.send(event).await.is_err() {
                    warn!("Failed to publish generation event: receiver dropped.");
                }
            }

            if let Some(question) = candidate {
                return Ok(GenerationSuccess {
                    question,
                    attempts: attempt,
                });
            }
            outcomes.push(outcome);
        }

        Err(InterviewError::GenerationExhausted {
            difficulty,
            tech_stack: tech_stack.to_string(),
            attempts: outcomes,
        })
    }

    /// One round. The candidate is returned only when it was accepted.
    async fn run_round(
        &self,
        difficulty: Difficulty,
        tech_stack: &str,
    ) -> (AttemptOutcome, Option<GeneratedQuestion>) {
        let candidate = match self.capability.generate(difficulty, tech_stack).await {
            Ok(candidate) => candidate,
            Err(e) => {
                return (
                    AttemptOutcome::CapabilityFailed {
                        stage: CapabilityStage::Generate,
                        message: format!("{e:#}"),
                    },
                    None,
                );
            }
        };

        match self
            .validator
            .validate(&candidate.question_text, tech_stack)
            .await
        {
            Ok(verdict) if verdict.is_valid => (AttemptOutcome::Accepted, Some(candidate)),
            Ok(verdict) => (
                AttemptOutcome::Rejected {
                    reasoning: verdict.reasoning,
                },
                None,
            ),
            Err(e) => (
                AttemptOutcome::CapabilityFailed {
                    stage: CapabilityStage::Validate,
                    message: e.to_string(),
                },
                None,
            ),
        }
    }
}
