use lms_core::model::{Bookmark, BookmarkListItem, TopicId, UserId};

use super::SqliteRepository;
use super::mapping::{bookmark_item_from_row, conn};
use crate::repository::{BookmarkRepository, StorageError};

#[async_trait::async_trait]
impl BookmarkRepository for SqliteRepository {
    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO bookmarks (user_id, topic_id, note, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, topic_id) DO UPDATE SET
                note = excluded.note
            ",
        )
        .bind(bookmark.user_id.value())
        .bind(bookmark.topic_id.as_str())
        .bind(&bookmark.note)
        .bind(bookmark.created_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, topic: &TopicId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM bookmarks WHERE user_id = ?1 AND topic_id = ?2")
            .bind(user.value())
            .bind(topic.as_str())
            .execute(self.pool())
            .await
            .map_err(conn)?;

        Ok(res.rows_affected() > 0)
    }

    async fn list_bookmarks(&self, user: UserId) -> Result<Vec<BookmarkListItem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT b.user_id, b.topic_id, b.note, b.created_at,
                   t.title AS topic_title, t.file_path, m.title AS module_title
            FROM bookmarks b
            JOIN topics t ON b.topic_id = t.id
            JOIN modules m ON t.module_id = m.id
            WHERE b.user_id = ?1
            ORDER BY b.created_at DESC
            ",
        )
        .bind(user.value())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(bookmark_item_from_row(&row)?);
        }
        Ok(items)
    }
}
