//! Difficulty bands and the score-to-difficulty adaptation rule.
//!
//! Everything here is pure: the next difficulty depends only on the session's
//! stored difficulty and the scores of its most recent answer.

use crate::scoring::{Scores, aggregate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound (inclusive) of the `Hard` band.
pub const HARD_THRESHOLD: f64 = 4.5;
/// Lower bound (inclusive) of the `Medium` band.
pub const MEDIUM_THRESHOLD: f64 = 3.0;

/// A question difficulty band, ordered by increasing expected complexity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Normalizes a caller-supplied override (`"hard"`, `" EASY "`, ...).
    ///
    /// Returns `None` for anything that is not one of the three labels, in which
    /// case the caller falls back to adaptive selection.
    pub fn from_override(raw: &str) -> Option<Difficulty> {
        let trimmed = raw.trim();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Classifies an average sub-score into its band.
    pub fn for_average(avg: f64) -> Difficulty {
        if avg >= HARD_THRESHOLD {
            Difficulty::Hard
        } else if avg >= MEDIUM_THRESHOLD {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognized difficulty (expected Easy, Medium or Hard)")]
pub struct UnknownDifficulty(pub String);

/// Strict parsing of a stored label. Use [`Difficulty::from_override`] for user input.
impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// Picks the difficulty for the next question of a session.
///
/// Without a previous answer, or with a partially scored one, the base
/// difficulty is returned unchanged.
pub fn next_difficulty(base: Difficulty, last_answer: Option<&Scores>) -> Difficulty {
    match last_answer.and_then(aggregate) {
        Some(avg) => Difficulty::for_average(avg),
        None => base,
    }
}

/// Applies a recognized explicit override, otherwise adapts from the last answer.
pub fn resolve_difficulty(
    explicit: Option<&str>,
    base: Difficulty,
    last_answer: Option<&Scores>,
) -> Difficulty {
    explicit
        .and_then(Difficulty::from_override)
        .unwrap_or_else(|| next_difficulty(base, last_answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(c: u8, e: u8, f: u8) -> Scores {
        Scores {
            correctness: Some(c),
            efficiency: Some(e),
            clarity: Some(f),
        }
    }

    #[test]
    fn test_no_answer_keeps_base() {
        for base in Difficulty::ALL {
            assert_eq!(next_difficulty(base, None), base);
        }
    }

    #[test]
    fn test_partial_scores_keep_base() {
        let partial = Scores {
            correctness: Some(5),
            efficiency: Some(5),
            clarity: None,
        };
        for base in Difficulty::ALL {
            assert_eq!(next_difficulty(base, Some(&partial)), base);
        }
    }

    #[test]
    fn test_bands_partition_every_score_triple() {
        for c in 0..=5u8 {
            for e in 0..=5u8 {
                for f in 0..=5u8 {
                    let triple = scores(c, e, f);
                    let avg = (c + e + f) as f64 / 3.0;
                    let expected = if avg >= 4.5 {
                        Difficulty::Hard
                    } else if avg >= 3.0 {
                        Difficulty::Medium
                    } else {
                        Difficulty::Easy
                    };
                    for base in Difficulty::ALL {
                        let first = next_difficulty(base, Some(&triple));
                        assert_eq!(first, expected, "triple ({c},{e},{f})");
                        assert_eq!(first, next_difficulty(base, Some(&triple)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_band_boundaries_are_inclusive_at_lower_bound() {
        assert_eq!(Difficulty::for_average(4.5), Difficulty::Hard);
        assert_eq!(Difficulty::for_average(4.499), Difficulty::Medium);
        assert_eq!(Difficulty::for_average(3.0), Difficulty::Medium);
        assert_eq!(Difficulty::for_average(2.999), Difficulty::Easy);
        assert_eq!(Difficulty::for_average(0.0), Difficulty::Easy);
        assert_eq!(Difficulty::for_average(5.0), Difficulty::Hard);
    }

    #[test]
    fn test_strong_then_weak_answers() {
        let strong = scores(5, 5, 4);
        assert_eq!(
            next_difficulty(Difficulty::Medium, Some(&strong)),
            Difficulty::Hard
        );

        let weak = scores(3, 2, 1);
        assert_eq!(
            next_difficulty(Difficulty::Hard, Some(&weak)),
            Difficulty::Easy
        );
    }

    #[test]
    fn test_override_normalization() {
        assert_eq!(Difficulty::from_override("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_override(" EASY "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_override("Medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_override("extreme"), None);
        assert_eq!(Difficulty::from_override(""), None);
    }

    #[test]
    fn test_resolve_prefers_recognized_override() {
        let weak = scores(0, 0, 0);
        assert_eq!(
            resolve_difficulty(Some("hard"), Difficulty::Medium, Some(&weak)),
            Difficulty::Hard
        );
        assert_eq!(
            resolve_difficulty(Some("impossible"), Difficulty::Medium, Some(&weak)),
            Difficulty::Easy
        );
        assert_eq!(
            resolve_difficulty(None, Difficulty::Medium, None),
            Difficulty::Medium
        );
    }

    #[test]
    fn test_strict_parse_and_display() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("hard".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "Easy");
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"Medium\"");
    }
}
