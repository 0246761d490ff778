use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{TopicId, UserId};

/// A user's bookmark on a topic. One per (user, topic); re-adding replaces
/// the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bookmark joined with the titles the listing UI needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkListItem {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub topic_title: String,
    pub file_path: String,
    pub module_title: String,
}
