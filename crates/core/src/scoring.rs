//! Sub-score handling: clamping raw capability scores and reducing the three
//! sub-scores of an answer into a single adaptive signal.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 5;

/// The three sub-scores recorded for an answer.
///
/// A field is `None` only for an answer that has not been scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Scores {
    pub correctness: Option<u8>,
    pub efficiency: Option<u8>,
    pub clarity: Option<u8>,
}

impl Scores {
    /// Builds a fully scored triple, clamping each raw value into `[0, 5]`.
    pub fn clamped(correctness: i64, efficiency: i64, clarity: i64) -> Self {
        Self {
            correctness: Some(clamp_score(correctness)),
            efficiency: Some(clamp_score(efficiency)),
            clarity: Some(clamp_score(clarity)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.correctness.is_some() && self.efficiency.is_some() && self.clarity.is_some()
    }
}

/// Forces a raw score into `[MIN_SCORE, MAX_SCORE]`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u8
}

/// Mean of the three sub-scores, or `None` if any of them is missing.
pub fn aggregate(scores: &Scores) -> Option<f64> {
    let correctness = scores.correctness?;
    let efficiency = scores.efficiency?;
    let clarity = scores.clarity?;
    Some((f64::from(correctness) + f64::from(efficiency) + f64::from(clarity)) / 3.0)
}
