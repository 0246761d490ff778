use lms_core::model::{Course, CourseId};

use super::SqliteRepository;
use super::mapping::{conn, course_from_row};
use crate::repository::{CourseRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO courses (id, title, description, level, duration_hours, total_modules, author, version, cover_image)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                level = excluded.level,
                duration_hours = excluded.duration_hours,
                total_modules = excluded.total_modules,
                author = excluded.author,
                version = excluded.version,
                cover_image = excluded.cover_image
            ",
        )
        .bind(course.id.as_str())
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.level)
        .bind(course.duration_hours)
        .bind(i64::from(course.total_modules))
        .bind(&course.author)
        .bind(&course.version)
        .bind(&course.cover_image)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query("SELECT * FROM courses ORDER BY title")
            .fetch_all(self.pool())
            .await
            .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            courses.push(course_from_row(&row)?);
        }
        Ok(courses)
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query("SELECT * FROM courses WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        match row {
            Some(row) => course_from_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
