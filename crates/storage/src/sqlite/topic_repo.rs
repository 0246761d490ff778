use chrono::Utc;
use lms_core::model::{ModuleId, Topic, TopicId};

use super::SqliteRepository;
use super::mapping::{conn, topic_from_row};
use crate::repository::{StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO topics (id, module_id, title, file_path, audio_path, evaluation_path, order_index, estimated_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                module_id = excluded.module_id,
                title = excluded.title,
                file_path = excluded.file_path,
                audio_path = excluded.audio_path,
                evaluation_path = excluded.evaluation_path,
                order_index = excluded.order_index,
                estimated_minutes = excluded.estimated_minutes
            ",
        )
        .bind(topic.id.as_str())
        .bind(topic.module_id.as_str())
        .bind(&topic.title)
        .bind(&topic.file_path)
        .bind(&topic.audio_path)
        .bind(&topic.evaluation_path)
        .bind(i64::from(topic.order_index))
        .bind(i64::from(topic.estimated_minutes))
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn topics_by_module(&self, module: &ModuleId) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query("SELECT * FROM topics WHERE module_id = ?1 ORDER BY order_index")
            .bind(module.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(conn)?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(topic_from_row(&row)?);
        }
        Ok(topics)
    }

    async fn get_topic(&self, id: &TopicId) -> Result<Option<Topic>, StorageError> {
        let row = sqlx::query("SELECT * FROM topics WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        match row {
            Some(row) => topic_from_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
