use lms_core::model::{CourseId, Module};

use super::SqliteRepository;
use super::mapping::{conn, module_from_row};
use crate::repository::{ModuleRepository, StorageError};

#[async_trait::async_trait]
impl ModuleRepository for SqliteRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO modules (id, course_id, module_number, title, description, order_index)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                module_number = excluded.module_number,
                title = excluded.title,
                description = excluded.description,
                order_index = excluded.order_index
            ",
        )
        .bind(module.id.as_str())
        .bind(module.course_id.as_str())
        .bind(i64::from(module.module_number))
        .bind(&module.title)
        .bind(&module.description)
        .bind(i64::from(module.order_index))
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn modules_by_course(&self, course: &CourseId) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query("SELECT * FROM modules WHERE course_id = ?1 ORDER BY order_index")
            .bind(course.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(conn)?;

        let mut modules = Vec::with_capacity(rows.len());
        for row in rows {
            modules.push(module_from_row(&row)?);
        }
        Ok(modules)
    }
}
