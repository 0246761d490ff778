use std::sync::Arc;

use serde::Serialize;

use lms_core::Clock;
use lms_core::model::{CourseId, CourseStats, ModuleId, Progress, TopicId, UserId};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

/// A user's progress rows for one course, together with the aggregate
/// counters.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub progress: Vec<Progress>,
    pub stats: CourseStats,
}

/// Orchestrates per-user progress tracking.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Progress rows and stats for one user across one course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn course_progress(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<CourseProgress, ProgressServiceError> {
        let progress = self.progress.course_progress(user, course).await?;
        let stats = self.progress.course_stats(user, course).await?;
        Ok(CourseProgress { progress, stats })
    }

    /// Progress on a single topic; a not-started row is reported for topics
    /// the user never touched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn topic_progress(
        &self,
        user: UserId,
        topic: &TopicId,
    ) -> Result<Progress, ProgressServiceError> {
        let existing = self.progress.topic_progress(user, topic).await?;
        Ok(existing
            .unwrap_or_else(|| Progress::not_started(user, topic.clone(), self.clock.now())))
    }

    /// Mark a topic completed for the user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the write fails.
    pub async fn mark_complete(
        &self,
        user: UserId,
        course: &CourseId,
        module: &ModuleId,
        topic: &TopicId,
    ) -> Result<(), ProgressServiceError> {
        self.progress
            .mark_completed(user, course, module, topic, self.clock.now())
            .await?;
        Ok(())
    }

    /// Record the latest playback/scroll position and accumulate time spent.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the write fails.
    pub async fn update_position(
        &self,
        user: UserId,
        topic: &TopicId,
        position: f64,
        time_spent_seconds: i64,
    ) -> Result<(), ProgressServiceError> {
        self.progress
            .update_position(user, topic, position, time_spent_seconds, self.clock.now())
            .await?;
        Ok(())
    }

    /// Aggregate completion counters for one user across one course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn course_stats(
        &self,
        user: UserId,
        course: &CourseId,
    ) -> Result<CourseStats, ProgressServiceError> {
        Ok(self.progress.course_stats(user, course).await?)
    }
}
