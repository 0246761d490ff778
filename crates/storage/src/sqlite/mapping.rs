use chrono::{DateTime, Utc};
use lms_core::model::{
    Bookmark, BookmarkListItem, Course, CourseId, CourseStats, EvaluationResult, Module,
    ModuleId, Progress, Topic, TopicId, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

pub(crate) fn course_from_row(row: &SqliteRow) -> Result<Course, StorageError> {
    Ok(Course {
        id: CourseId::new(row.try_get::<String, _>("id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        level: row.try_get("level").map_err(ser)?,
        duration_hours: row.try_get("duration_hours").map_err(ser)?,
        total_modules: u32_from_i64(
            "total_modules",
            row.try_get::<i64, _>("total_modules").map_err(ser)?,
        )?,
        author: row.try_get("author").map_err(ser)?,
        version: row.try_get("version").map_err(ser)?,
        cover_image: row.try_get("cover_image").map_err(ser)?,
    })
}

pub(crate) fn module_from_row(row: &SqliteRow) -> Result<Module, StorageError> {
    Ok(Module {
        id: ModuleId::new(row.try_get::<String, _>("id").map_err(ser)?),
        course_id: CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?),
        module_number: u32_from_i64(
            "module_number",
            row.try_get::<i64, _>("module_number").map_err(ser)?,
        )?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        order_index: u32_from_i64(
            "order_index",
            row.try_get::<i64, _>("order_index").map_err(ser)?,
        )?,
    })
}

pub(crate) fn topic_from_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    Ok(Topic {
        id: TopicId::new(row.try_get::<String, _>("id").map_err(ser)?),
        module_id: ModuleId::new(row.try_get::<String, _>("module_id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        file_path: row.try_get("file_path").map_err(ser)?,
        audio_path: row.try_get("audio_path").map_err(ser)?,
        evaluation_path: row.try_get("evaluation_path").map_err(ser)?,
        order_index: u32_from_i64(
            "order_index",
            row.try_get::<i64, _>("order_index").map_err(ser)?,
        )?,
        estimated_minutes: u32_from_i64(
            "estimated_minutes",
            row.try_get::<i64, _>("estimated_minutes").map_err(ser)?,
        )?,
    })
}

pub(crate) fn progress_from_row(row: &SqliteRow) -> Result<Progress, StorageError> {
    Ok(Progress {
        user_id: UserId::new(row.try_get::<i64, _>("user_id").map_err(ser)?),
        topic_id: TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        course_id: row
            .try_get::<Option<String>, _>("course_id")
            .map_err(ser)?
            .map(CourseId::new),
        module_id: row
            .try_get::<Option<String>, _>("module_id")
            .map_err(ser)?
            .map(ModuleId::new),
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        completed_at: row
            .try_get::<Option<DateTime<Utc>>, _>("completed_at")
            .map_err(ser)?,
        last_position: row.try_get("last_position").map_err(ser)?,
        time_spent_seconds: row.try_get("time_spent_seconds").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn evaluation_from_row(row: &SqliteRow) -> Result<EvaluationResult, StorageError> {
    let answers_raw: String = row.try_get("answers").map_err(ser)?;
    Ok(EvaluationResult {
        id: row.try_get("id").map_err(ser)?,
        user_id: UserId::new(row.try_get::<i64, _>("user_id").map_err(ser)?),
        topic_id: TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        score: row.try_get("score").map_err(ser)?,
        max_score: row.try_get("max_score").map_err(ser)?,
        percentage: row.try_get("percentage").map_err(ser)?,
        passed: row.try_get::<i64, _>("passed").map_err(ser)? != 0,
        answers: serde_json::from_str(&answers_raw).map_err(ser)?,
        time_spent_seconds: row.try_get("time_spent_seconds").map_err(ser)?,
        attempt_number: u32_from_i64(
            "attempt_number",
            row.try_get::<i64, _>("attempt_number").map_err(ser)?,
        )?,
        submitted_at: row.try_get("submitted_at").map_err(ser)?,
    })
}

pub(crate) fn bookmark_from_row(row: &SqliteRow) -> Result<Bookmark, StorageError> {
    Ok(Bookmark {
        user_id: UserId::new(row.try_get::<i64, _>("user_id").map_err(ser)?),
        topic_id: TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        note: row.try_get("note").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn bookmark_item_from_row(row: &SqliteRow) -> Result<BookmarkListItem, StorageError> {
    let bookmark = bookmark_from_row(row)?;
    Ok(BookmarkListItem {
        user_id: bookmark.user_id,
        topic_id: bookmark.topic_id,
        note: bookmark.note,
        created_at: bookmark.created_at,
        topic_title: row.try_get("topic_title").map_err(ser)?,
        file_path: row.try_get("file_path").map_err(ser)?,
        module_title: row.try_get("module_title").map_err(ser)?,
    })
}

pub(crate) fn stats_from_row(row: &SqliteRow) -> Result<CourseStats, StorageError> {
    Ok(CourseStats {
        total_topics: u32_from_i64(
            "total_topics",
            row.try_get::<i64, _>("total_topics").map_err(ser)?,
        )?,
        completed_topics: u32_from_i64(
            "completed_topics",
            row.try_get::<i64, _>("completed_topics").map_err(ser)?,
        )?,
        total_modules: u32_from_i64(
            "total_modules",
            row.try_get::<i64, _>("total_modules").map_err(ser)?,
        )?,
        completed_modules: u32_from_i64(
            "completed_modules",
            row.try_get::<i64, _>("completed_modules").map_err(ser)?,
        )?,
        total_time_seconds: row.try_get("total_time_seconds").map_err(ser)?,
    })
}
