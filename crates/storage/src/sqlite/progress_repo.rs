use chrono::{DateTime, Utc};
use lms_core::model::{CourseId, CourseStats, ModuleId, Progress, TopicId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, progress_from_row, stats_from_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn topic_progress(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query("SELECT * FROM progress WHERE user_id = ?1 AND topic_id = ?2")
            .bind(user.value())
            .bind(topic.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        match row {
            Some(row) => progress_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn course_progress(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query("SELECT * FROM progress WHERE user_id = ?1 AND course_id = ?2")
            .bind(user.value())
            .bind(course.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(conn)?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in rows {
            progress.push(progress_from_row(&row)?);
        }
        Ok(progress)
    }

    async fn mark_completed(
        &self,
        user: UserId,
        course: &CourseId,
        module: &ModuleId,
        topic: &TopicId,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (user_id, topic_id, course_id, module_id, completed, completed_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            ON CONFLICT(user_id, topic_id) DO UPDATE SET
                course_id = excluded.course_id,
                module_id = excluded.module_id,
                completed = 1,
                completed_at = excluded.completed_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user.value())
        .bind(topic.as_str())
        .bind(course.as_str())
        .bind(module.as_str())
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn update_position(
        &self,
        user: UserId,
        topic: &TopicId,
        position: f64,
        time_delta: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (user_id, topic_id, last_position, time_spent_seconds, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, topic_id) DO UPDATE SET
                last_position = excluded.last_position,
                time_spent_seconds = progress.time_spent_seconds + excluded.time_spent_seconds,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user.value())
        .bind(topic.as_str())
        .bind(position)
        .bind(time_delta)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn course_stats(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<CourseStats, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(DISTINCT t.id) AS total_topics,
                COUNT(DISTINCT CASE WHEN p.completed = 1 THEN t.id END) AS completed_topics,
                COUNT(DISTINCT t.module_id) AS total_modules,
                COUNT(DISTINCT CASE WHEN p.completed = 1 THEN t.module_id END) AS completed_modules,
                COALESCE(SUM(p.time_spent_seconds), 0) AS total_time_seconds
            FROM topics t
            JOIN modules m ON t.module_id = m.id
            LEFT JOIN progress p ON t.id = p.topic_id AND p.user_id = ?1
            WHERE m.course_id = ?2
            ",
        )
        .bind(user.value())
        .bind(course.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(conn)?;

        stats_from_row(&row)
    }
}
