use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{TopicId, UserId};

/// Minimum percentage required to pass an evaluation.
pub const PASS_THRESHOLD_PERCENT: f64 = 70.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("max score must be greater than zero")]
    InvalidMaxScore,

    #[error("score must be between zero and max score")]
    ScoreOutOfRange,
}

/// Grading derived from a raw score: the percentage and whether it clears
/// the pass threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub percentage: f64,
    pub passed: bool,
}

impl EvaluationOutcome {
    /// Grades a submitted score against a maximum.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError` when `max_score` is not positive or the
    /// score falls outside `[0, max_score]`.
    pub fn grade(score: f64, max_score: f64) -> Result<Self, EvaluationError> {
        if !(max_score.is_finite() && max_score > 0.0) {
            return Err(EvaluationError::InvalidMaxScore);
        }
        if !(0.0..=max_score).contains(&score) {
            return Err(EvaluationError::ScoreOutOfRange);
        }
        let percentage = (score / max_score) * 100.0;
        Ok(Self {
            percentage,
            passed: percentage >= PASS_THRESHOLD_PERCENT,
        })
    }
}

/// One submitted quiz attempt. Append-only; the attempt number increases
/// monotonically per (user, topic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub id: i64,
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub passed: bool,
    /// Raw answers exactly as submitted by the client.
    pub answers: serde_json::Value,
    pub time_spent_seconds: i64,
    pub attempt_number: u32,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_of_ten_is_a_pass_at_exactly_seventy() {
        let outcome = EvaluationOutcome::grade(7.0, 10.0).unwrap();
        assert_eq!(outcome.percentage, 70.0);
        assert!(outcome.passed);
    }

    #[test]
    fn six_of_ten_fails() {
        let outcome = EvaluationOutcome::grade(6.0, 10.0).unwrap();
        assert!(!outcome.passed);
    }

    #[test]
    fn rejects_nonpositive_max_score() {
        assert_eq!(
            EvaluationOutcome::grade(1.0, 0.0),
            Err(EvaluationError::InvalidMaxScore)
        );
    }

    #[test]
    fn rejects_score_above_max() {
        assert_eq!(
            EvaluationOutcome::grade(11.0, 10.0),
            Err(EvaluationError::ScoreOutOfRange)
        );
    }
}
