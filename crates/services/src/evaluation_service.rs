use std::sync::Arc;

use lms_core::Clock;
use lms_core::model::{EvaluationOutcome, EvaluationResult, TopicId, UserId};
use storage::repository::{EvaluationRepository, NewEvaluationResult};

use crate::error::EvaluationServiceError;

/// A quiz attempt as submitted by the client, before grading.
#[derive(Debug, Clone)]
pub struct EvaluationSubmission {
    pub topic_id: TopicId,
    pub score: f64,
    pub max_score: f64,
    pub answers: serde_json::Value,
    pub time_spent_seconds: i64,
}

/// Grades submitted quiz attempts and appends them to the result log.
#[derive(Clone)]
pub struct EvaluationService {
    clock: Clock,
    evaluations: Arc<dyn EvaluationRepository>,
}

impl EvaluationService {
    #[must_use]
    pub fn new(clock: Clock, evaluations: Arc<dyn EvaluationRepository>) -> Self {
        Self { clock, evaluations }
    }

    /// Grade a submission against the fixed pass threshold and append it.
    /// The attempt number is assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationServiceError::Evaluation` when the score/max pair
    /// is invalid, `EvaluationServiceError::Storage` if persistence fails.
    pub async fn submit(
        &self,
        user: UserId,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationResult, EvaluationServiceError> {
        let outcome = EvaluationOutcome::grade(submission.score, submission.max_score)?;
        let stored = self
            .evaluations
            .record_result(NewEvaluationResult {
                user_id: user,
                topic_id: submission.topic_id,
                score: submission.score,
                max_score: submission.max_score,
                percentage: outcome.percentage,
                passed: outcome.passed,
                answers: submission.answers,
                time_spent_seconds: submission.time_spent_seconds,
                submitted_at: self.clock.now(),
            })
            .await?;
        Ok(stored)
    }

    /// All attempts of one user on one topic, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationServiceError::Storage` if repository access fails.
    pub async fn results(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Vec<EvaluationResult>, EvaluationServiceError> {
        Ok(self.evaluations.results_for_topic(user, topic).await?)
    }
}
