use std::sync::Arc;

use lms_core::Clock;
use lms_core::model::{Bookmark, BookmarkListItem, TopicId, UserId};
use storage::repository::BookmarkRepository;

use crate::error::BookmarkServiceError;

/// Per-user topic bookmarks.
#[derive(Clone)]
pub struct BookmarkService {
    clock: Clock,
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl BookmarkService {
    #[must_use]
    pub fn new(clock: Clock, bookmarks: Arc<dyn BookmarkRepository>) -> Self {
        Self { clock, bookmarks }
    }

    /// Bookmark a topic; re-adding replaces the note.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkServiceError::Storage` if the write fails.
    pub async fn add(
        &self,
        user: UserId,
        topic: TopicId,
        note: Option<String>,
    ) -> Result<(), BookmarkServiceError> {
        self.bookmarks
            .add_bookmark(&Bookmark {
                user_id: user,
                topic_id: topic,
                note,
                created_at: self.clock.now(),
            })
            .await?;
        Ok(())
    }

    /// Remove a bookmark. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkServiceError::Storage` if the write fails.
    pub async fn remove(&self, user: UserId, topic: &TopicId) -> Result<bool, BookmarkServiceError> {
        Ok(self.bookmarks.remove_bookmark(user, topic).await?)
    }

    /// The user's bookmarks with topic/module titles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkServiceError::Storage` if repository access fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<BookmarkListItem>, BookmarkServiceError> {
        Ok(self.bookmarks.list_bookmarks(user).await?)
    }
}
