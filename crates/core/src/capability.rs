//! Contracts for the three language-model-backed capabilities.
//!
//! Any provider satisfying these traits is interchangeable. Implementations are
//! constructed by the caller and injected into the validator, generator and
//! evaluator, so tests can substitute deterministic fakes.

use crate::difficulty::Difficulty;
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A candidate question returned by the generation capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedQuestion {
    /// The full text of the generated interview question.
    pub question_text: String,
    /// The difficulty the provider assessed the question at.
    pub difficulty: Difficulty,
}

/// The pass/fail verdict of the validation capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    /// Why the question was accepted or rejected (e.g. "not relevant to the tech stack").
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum OverallAssessment {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl OverallAssessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallAssessment::Excellent => "Excellent",
            OverallAssessment::Good => "Good",
            OverallAssessment::Average => "Average",
            OverallAssessment::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for OverallAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallAssessment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        [
            OverallAssessment::Excellent,
            OverallAssessment::Good,
            OverallAssessment::Average,
            OverallAssessment::NeedsImprovement,
        ]
        .into_iter()
        .find(|a| a.as_str() == s)
        .ok_or_else(|| anyhow::anyhow!("'{}' is not a recognized overall assessment", s))
    }
}

/// The evaluation capability's response, exactly as returned.
///
/// Scores are not clamped here; they may fall outside `[0, 5]`. Providers
/// that send a score as a float or a numeric string are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawEvaluation {
    #[serde(deserialize_with = "deserialize_score")]
    pub score_correctness: i64,
    #[serde(deserialize_with = "deserialize_score")]
    pub score_efficiency: i64,
    #[serde(deserialize_with = "deserialize_score")]
    pub score_clarity: i64,
    /// Constructive feedback explaining the scores.
    pub feedback: String,
    pub overall_assessment: OverallAssessment,
}

/// Reads a score given as an integer, a float (rounded) or a numeric string.
fn deserialize_score<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(round_score)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(round_score))
        }
        _ => None,
    };
    number.ok_or_else(|| serde::de::Error::custom(format!("invalid score: {}", value)))
}

fn round_score(value: f64) -> i64 {
    // NaN casts to 0 and infinities saturate; clamping happens downstream.
    value.round() as i64
}

/// Produces a candidate question at a difficulty for a tech stack.
#[async_trait]
pub trait QuestionGeneration: Send + Sync {
    async fn generate(&self, difficulty: Difficulty, tech_stack: &str)
    -> Result<GeneratedQuestion>;
}

/// Screens a candidate question before it is shown to the candidate.
#[async_trait]
pub trait QuestionValidation: Send + Sync {
    async fn validate(&self, question_text: &str, tech_stack: &str) -> Result<ValidationVerdict>;
}

/// Scores a candidate's answer to a question.
#[async_trait]
pub trait AnswerEvaluation: Send + Sync {
    async fn evaluate(&self, question: &str, answer: &str, tech_stack: &str)
    -> Result<RawEvaluation>;
}
