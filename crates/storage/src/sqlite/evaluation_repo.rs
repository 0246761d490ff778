use lms_core::model::{EvaluationResult, TopicId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, evaluation_from_row, ser};
use crate::repository::{EvaluationRepository, NewEvaluationResult, StorageError};

#[async_trait::async_trait]
impl EvaluationRepository for SqliteRepository {
    async fn record_result(
        &self,
        result: NewEvaluationResult,
    ) -> Result<EvaluationResult, StorageError> {
        // Attempt numbering is a separate read; the window between it and
        // the insert is an accepted limitation of single-statement writes.
        let row = sqlx::query(
            r"
            SELECT COALESCE(MAX(attempt_number), 0) + 1 AS next_attempt
            FROM evaluation_results
            WHERE user_id = ?1 AND topic_id = ?2
            ",
        )
        .bind(result.user_id.value())
        .bind(result.topic_id.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(conn)?;
        let next_attempt: i64 = row.try_get("next_attempt").map_err(ser)?;

        let answers = serde_json::to_string(&result.answers).map_err(ser)?;
        let res = sqlx::query(
            r"
            INSERT INTO evaluation_results
                (user_id, topic_id, score, max_score, percentage, passed, answers, time_spent_seconds, attempt_number, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(result.user_id.value())
        .bind(result.topic_id.as_str())
        .bind(result.score)
        .bind(result.max_score)
        .bind(result.percentage)
        .bind(i64::from(result.passed))
        .bind(answers)
        .bind(result.time_spent_seconds)
        .bind(next_attempt)
        .bind(result.submitted_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        let attempt_number =
            u32::try_from(next_attempt).map_err(|_| ser("attempt_number out of range"))?;
        Ok(EvaluationResult {
            id: res.last_insert_rowid(),
            user_id: result.user_id,
            topic_id: result.topic_id,
            score: result.score,
            max_score: result.max_score,
            percentage: result.percentage,
            passed: result.passed,
            answers: result.answers,
            time_spent_seconds: result.time_spent_seconds,
            attempt_number,
            submitted_at: result.submitted_at,
        })
    }

    async fn results_for_topic(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Vec<EvaluationResult>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT * FROM evaluation_results
            WHERE user_id = ?1 AND topic_id = ?2
            ORDER BY submitted_at DESC, attempt_number DESC
            ",
        )
        .bind(user.value())
        .bind(topic.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(evaluation_from_row(&row)?);
        }
        Ok(results)
    }
}
