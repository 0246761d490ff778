use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::model::{
    Bookmark, BookmarkListItem, Course, CourseId, CourseStats, EvaluationResult, Module,
    ModuleId, Progress, Topic, TopicId, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A graded attempt as handed to the store. The attempt number is assigned
/// by the repository (`max(existing) + 1`, starting at 1), not by callers.
#[derive(Debug, Clone)]
pub struct NewEvaluationResult {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub passed: bool,
    pub answers: serde_json::Value,
    pub time_spent_seconds: i64,
    pub submitted_at: DateTime<Utc>,
}

/// Courses, refreshed wholesale by the scanner.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert or fully overwrite a course row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// All courses, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Fetch a course by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError>;
}

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Insert or update a module row, keyed on its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Modules of a course, ordered by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn modules_by_course(&self, course: &CourseId) -> Result<Vec<Module>, StorageError>;
}

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Insert or update a topic row, keyed on its identifier. Rescanning an
    /// unchanged tree therefore leaves rows byte-identical.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Topics of a module, ordered by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn topics_by_module(&self, module: &ModuleId) -> Result<Vec<Topic>, StorageError>;

    /// Fetch a topic by id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn get_topic(&self, id: &TopicId) -> Result<Option<Topic>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Progress of one user on one topic. `Ok(None)` before any interaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn topic_progress(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Option<Progress>, StorageError>;

    /// All progress rows of one user carrying the given course context.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn course_progress(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<Vec<Progress>, StorageError>;

    /// Mark a topic completed, creating the row on first interaction. The
    /// playback position and accumulated time are preserved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn mark_completed(
        &self,
        user: UserId,
        course: &CourseId,
        module: &ModuleId,
        topic: &TopicId,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Record the latest playback/scroll position and add `time_delta`
    /// seconds to the accumulated total. The completion flag is preserved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn update_position(
        &self,
        user: UserId,
        topic: &TopicId,
        position: f64,
        time_delta: i64,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Completion counters for one user across one course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn course_stats(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<CourseStats, StorageError>;
}

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Append a graded attempt, assigning the next attempt number for the
    /// (user, topic) pair. Returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    async fn record_result(
        &self,
        result: NewEvaluationResult,
    ) -> Result<EvaluationResult, StorageError>;

    /// All attempts of one user on one topic, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn results_for_topic(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Vec<EvaluationResult>, StorageError>;
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Add a bookmark, replacing the note if one already exists for the
    /// (user, topic) pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError>;

    /// Remove a bookmark. Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn remove_bookmark(&self, user: UserId, topic: &TopicId) -> Result<bool, StorageError>;

    /// A user's bookmarks joined with topic/module titles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_bookmarks(&self, user: UserId) -> Result<Vec<BookmarkListItem>, StorageError>;
}

/// Simple in-memory implementation for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    courses: HashMap<CourseId, Course>,
    modules: HashMap<ModuleId, Module>,
    topics: HashMap<TopicId, Topic>,
    progress: HashMap<(UserId, TopicId), Progress>,
    evaluations: Vec<EvaluationResult>,
    bookmarks: HashMap<(UserId, TopicId), Bookmark>,
    next_evaluation_id: i64,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.courses.insert(course.id.clone(), course.clone());
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let state = self.lock()?;
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        let state = self.lock()?;
        Ok(state.courses.get(id).cloned())
    }
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.modules.insert(module.id.clone(), module.clone());
        Ok(())
    }

    async fn modules_by_course(&self, course: &CourseId) -> Result<Vec<Module>, StorageError> {
        let state = self.lock()?;
        let mut modules: Vec<Module> = state
            .modules
            .values()
            .filter(|m| &m.course_id == course)
            .cloned()
            .collect();
        modules.sort_by_key(|m| m.order_index);
        Ok(modules)
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.topics.insert(topic.id.clone(), topic.clone());
        Ok(())
    }

    async fn topics_by_module(&self, module: &ModuleId) -> Result<Vec<Topic>, StorageError> {
        let state = self.lock()?;
        let mut topics: Vec<Topic> = state
            .topics
            .values()
            .filter(|t| &t.module_id == module)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.order_index);
        Ok(topics)
    }

    async fn get_topic(&self, id: &TopicId) -> Result<Option<Topic>, StorageError> {
        let state = self.lock()?;
        Ok(state.topics.get(id).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn topic_progress(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Option<Progress>, StorageError> {
        let state = self.lock()?;
        Ok(state.progress.get(&(user, topic.clone())).cloned())
    }

    async fn course_progress(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<Vec<Progress>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .progress
            .values()
            .filter(|p| p.user_id == user && p.course_id.as_ref() == Some(course))
            .cloned()
            .collect())
    }

    async fn mark_completed(
        &self,
        user: UserId,
        course: &CourseId,
        module: &ModuleId,
        topic: &TopicId,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let entry = state
            .progress
            .entry((user, topic.clone()))
            .or_insert_with(|| Progress::not_started(user, topic.clone(), now));
        entry.course_id = Some(course.clone());
        entry.module_id = Some(module.clone());
        entry.completed = true;
        entry.completed_at = Some(now);
        entry.updated_at = now;
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
        let mut state = self.lock()?;
        let entry = state
            .progress
            .entry((user, topic.clone()))
            .or_insert_with(|| Progress::not_started(user, topic.clone(), now));
        entry.last_position = position;
        entry.time_spent_seconds += time_delta;
        entry.updated_at = now;
        Ok(())
    }

    async fn course_stats(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<CourseStats, StorageError> {
        let state = self.lock()?;
        let module_ids: Vec<&ModuleId> = state
            .modules
            .values()
            .filter(|m| &m.course_id == course)
            .map(|m| &m.id)
            .collect();

        let mut stats = CourseStats::default();
        let mut completed_modules: Vec<&ModuleId> = Vec::new();
        for topic in state
            .topics
            .values()
            .filter(|t| module_ids.contains(&&t.module_id))
        {
            stats.total_topics += 1;
            if let Some(progress) = state.progress.get(&(user, topic.id.clone())) {
                stats.total_time_seconds += progress.time_spent_seconds;
                if progress.completed {
                    stats.completed_topics += 1;
                    if !completed_modules.contains(&&topic.module_id) {
                        completed_modules.push(&topic.module_id);
                    }
                }
            }
        }
        stats.total_modules = u32::try_from(module_ids.len()).unwrap_or(u32::MAX);
        stats.completed_modules = u32::try_from(completed_modules.len()).unwrap_or(u32::MAX);
        Ok(stats)
    }
}

#[async_trait]
impl EvaluationRepository for InMemoryRepository {
    async fn record_result(
        &self,
        result: NewEvaluationResult,
    ) -> Result<EvaluationResult, StorageError> {
        let mut state = self.lock()?;
        let attempt_number = state
            .evaluations
            .iter()
            .filter(|r| r.user_id == result.user_id && r.topic_id == result.topic_id)
            .map(|r| r.attempt_number)
            .max()
            .unwrap_or(0)
            + 1;
        state.next_evaluation_id += 1;
        let stored = EvaluationResult {
            id: state.next_evaluation_id,
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
        };
        state.evaluations.push(stored.clone());
        Ok(stored)
    }

    async fn results_for_topic(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Vec<EvaluationResult>, StorageError> {
        let state = self.lock()?;
        let mut results: Vec<EvaluationResult> = state
            .evaluations
            .iter()
            .filter(|r| r.user_id == user && &r.topic_id == topic)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryRepository {
    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.bookmarks.insert(
            (bookmark.user_id, bookmark.topic_id.clone()),
            bookmark.clone(),
        );
        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, topic: &TopicId) -> Result<bool, StorageError> {
        let mut state = self.lock()?;
        Ok(state.bookmarks.remove(&(user, topic.clone())).is_some())
    }

    async fn list_bookmarks(&self, user: UserId) -> Result<Vec<BookmarkListItem>, StorageError> {
        let state = self.lock()?;
        let mut items: Vec<BookmarkListItem> = state
            .bookmarks
            .values()
            .filter(|b| b.user_id == user)
            .map(|b| {
                let topic = state.topics.get(&b.topic_id);
                let module_title = topic
                    .and_then(|t| state.modules.get(&t.module_id))
                    .map(|m| m.title.clone())
                    .unwrap_or_default();
                BookmarkListItem {
                    user_id: b.user_id,
                    topic_id: b.topic_id.clone(),
                    note: b.note.clone(),
                    created_at: b.created_at,
                    topic_title: topic.map(|t| t.title.clone()).unwrap_or_default(),
                    file_path: topic.map(|t| t.file_path.clone()).unwrap_or_default(),
                    module_title,
                }
            })
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

/// Aggregates the repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub evaluations: Arc<dyn EvaluationRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            courses: Arc::new(repo.clone()),
            modules: Arc::new(repo.clone()),
            topics: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            evaluations: Arc::new(repo.clone()),
            bookmarks: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::time::fixed_now;

    fn build_topic(id: &str, module: &ModuleId, order: u32) -> Topic {
        Topic {
            id: TopicId::new(id),
            module_id: module.clone(),
            title: format!("Topic {order}"),
            file_path: format!("{id}.md"),
            audio_path: None,
            evaluation_path: None,
            order_index: order,
            estimated_minutes: 0,
        }
    }

    #[tokio::test]
    async fn progress_updates_preserve_untouched_fields() {
        let repo = InMemoryRepository::new();
        let user = UserId::guest();
        let course = CourseId::new("c");
        let module = ModuleId::child_of(&course, "modulo1");
        let topic = TopicId::child_of(&module, "tema_1");
        let now = fixed_now();

        repo.update_position(user, &topic, 42.5, 30, now)
            .await
            .unwrap();
        repo.mark_completed(user, &course, &module, &topic, now)
            .await
            .unwrap();

        let progress = repo.topic_progress(user, &topic).await.unwrap().unwrap();
        assert!(progress.completed);
        assert_eq!(progress.last_position, 42.5);
        assert_eq!(progress.time_spent_seconds, 30);
    }

    #[tokio::test]
    async fn attempt_numbers_increase_per_user_and_topic() {
        let repo = InMemoryRepository::new();
        let topic = TopicId::new("c/m/t");
        let submission = NewEvaluationResult {
            user_id: UserId::guest(),
            topic_id: topic.clone(),
            score: 7.0,
            max_score: 10.0,
            percentage: 70.0,
            passed: true,
            answers: serde_json::json!([]),
            time_spent_seconds: 60,
            submitted_at: fixed_now(),
        };

        let first = repo.record_result(submission.clone()).await.unwrap();
        let second = repo.record_result(submission).await.unwrap();
        assert_eq!(first.attempt_number, 1);
        assert_eq!(second.attempt_number, 2);
    }

    #[tokio::test]
    async fn stats_count_topics_and_modules() {
        let repo = InMemoryRepository::new();
        let user = UserId::guest();
        let course = CourseId::new("c");
        let module = ModuleId::child_of(&course, "modulo1");
        repo.upsert_module(&Module {
            id: module.clone(),
            course_id: course.clone(),
            module_number: 1,
            title: "Módulo 1".into(),
            description: String::new(),
            order_index: 0,
        })
        .await
        .unwrap();
        let first = build_topic("c/modulo1/a", &module, 0);
        let second = build_topic("c/modulo1/b", &module, 1);
        repo.upsert_topic(&first).await.unwrap();
        repo.upsert_topic(&second).await.unwrap();

        repo.mark_completed(user, &course, &module, &first.id, fixed_now())
            .await
            .unwrap();

        let stats = repo.course_stats(user, &course).await.unwrap();
        assert_eq!(stats.total_topics, 2);
        assert_eq!(stats.completed_topics, 1);
        assert_eq!(stats.total_modules, 1);
        assert_eq!(stats.completed_modules, 1);
    }
}
