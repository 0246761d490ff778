use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use lms_core::model::{Topic, TopicId};
use storage::repository::TopicRepository;

use crate::error::ContentServiceError;

/// A topic row together with its markdown body.
#[derive(Debug, Clone, Serialize)]
pub struct TopicContent {
    #[serde(flatten)]
    pub topic: Topic,
    pub content: String,
}

/// Resolves cataloged paths against the content root and reads file bodies.
#[derive(Clone)]
pub struct ContentService {
    content_dir: PathBuf,
    topics: Arc<dyn TopicRepository>,
}

impl ContentService {
    #[must_use]
    pub fn new(content_dir: impl Into<PathBuf>, topics: Arc<dyn TopicRepository>) -> Self {
        Self {
            content_dir: content_dir.into(),
            topics,
        }
    }

    /// Fetch a topic row. `Ok(None)` when it is not cataloged.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn topic(&self, id: &TopicId) -> Result<Option<Topic>, ContentServiceError> {
        Ok(self.topics.get_topic(id).await?)
    }

    /// A topic with its markdown body. `Ok(None)` when the topic is not
    /// cataloged or its file has disappeared from disk since the last scan.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` on repository failure and
    /// `ContentServiceError::Io` when an existing file cannot be read.
    pub async fn topic_content(
        &self,
        id: &TopicId,
    ) -> Result<Option<TopicContent>, ContentServiceError> {
        let Some(topic) = self.topics.get_topic(id).await? else {
            return Ok(None);
        };

        let path = self.content_dir.join(&topic.file_path);
        if !path.is_file() {
            warn!("content file not found: {}", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Some(TopicContent { topic, content }))
    }

    /// The markdown body of a topic's linked evaluation. `Ok(None)` when the
    /// linked file has disappeared from disk since the last scan.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Io` when an existing file cannot be
    /// read.
    pub fn evaluation_content(&self, topic: &Topic) -> Result<Option<String>, ContentServiceError> {
        let Some(relative) = topic.evaluation_path.as_deref() else {
            return Ok(None);
        };
        let path = self.content_dir.join(relative);
        if !path.is_file() {
            warn!("evaluation file not found: {}", path.display());
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    /// Absolute path of a topic's audio file, when one is linked and still
    /// present on disk.
    #[must_use]
    pub fn audio_file(&self, topic: &Topic) -> Option<PathBuf> {
        let relative = topic.audio_path.as_deref()?;
        let path = self.content_dir.join(relative);
        path.is_file().then_some(path)
    }

    /// Absolute path of a static file under the content root. Rejects
    /// traversal outside the root.
    #[must_use]
    pub fn resolve_static(&self, relative: &str) -> Option<PathBuf> {
        let candidate = Path::new(relative);
        let safe = candidate.components().all(|component| {
            matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if !safe || candidate.is_absolute() {
            return None;
        }
        let path = self.content_dir.join(candidate);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service() -> ContentService {
        ContentService::new(std::env::temp_dir(), Arc::new(InMemoryRepository::new()))
    }

    #[test]
    fn static_paths_cannot_escape_the_root() {
        let content = service();
        assert!(content.resolve_static("../etc/passwd").is_none());
        assert!(content.resolve_static("/etc/passwd").is_none());
        assert!(content.resolve_static("a/../../etc/passwd").is_none());
    }
}
