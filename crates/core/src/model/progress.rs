use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, ModuleId, TopicId, UserId};

/// Per-user, per-topic progress. Created on first interaction, updated
/// thereafter, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: UserId,
    pub topic_id: TopicId,
    /// Course/module context, recorded when the topic is marked complete.
    pub course_id: Option<CourseId>,
    pub module_id: Option<ModuleId>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Last playback or scroll position.
    pub last_position: f64,
    /// Accumulated, not last-write-wins.
    pub time_spent_seconds: i64,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    /// The shape reported for a topic the user has not interacted with yet.
    #[must_use]
    pub fn not_started(user_id: UserId, topic_id: TopicId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            topic_id,
            course_id: None,
            module_id: None,
            completed: false,
            completed_at: None,
            last_position: 0.0,
            time_spent_seconds: 0,
            updated_at: now,
        }
    }
}

/// Aggregated completion counters for one user across one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseStats {
    pub total_topics: u32,
    pub completed_topics: u32,
    pub total_modules: u32,
    pub completed_modules: u32,
    pub total_time_seconds: i64,
}

impl CourseStats {
    /// Completed-topic percentage, rounded to two decimals. Zero when the
    /// course has no topics.
    #[must_use]
    pub fn completion_percentage(&self) -> f64 {
        if self.total_topics == 0 {
            return 0.0;
        }
        let raw = f64::from(self.completed_topics) / f64::from(self.total_topics) * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let stats = CourseStats {
            total_topics: 3,
            completed_topics: 1,
            ..CourseStats::default()
        };
        assert!((stats.completion_percentage() - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_of_empty_course_is_zero() {
        assert_eq!(CourseStats::default().completion_percentage(), 0.0);
    }
}
