use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the catalog tables (courses, modules, topics), the per-user
/// tables (progress, evaluation results, bookmarks) and their indexes.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS courses (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    level TEXT NOT NULL,
                    duration_hours REAL NOT NULL DEFAULT 0,
                    total_modules INTEGER NOT NULL DEFAULT 0 CHECK (total_modules >= 0),
                    author TEXT NOT NULL DEFAULT '',
                    version TEXT NOT NULL DEFAULT '',
                    cover_image TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS modules (
                    id TEXT PRIMARY KEY,
                    course_id TEXT NOT NULL,
                    module_number INTEGER NOT NULL CHECK (module_number >= 0),
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS topics (
                    id TEXT PRIMARY KEY,
                    module_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    file_path TEXT NOT NULL,
                    audio_path TEXT,
                    evaluation_path TEXT,
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    estimated_minutes INTEGER NOT NULL DEFAULT 0 CHECK (estimated_minutes >= 0),
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Progress rows deliberately carry no foreign keys: they must
        // survive rescans that reshape the catalog.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress (
                    user_id INTEGER NOT NULL,
                    topic_id TEXT NOT NULL,
                    course_id TEXT,
                    module_id TEXT,
                    completed INTEGER NOT NULL DEFAULT 0,
                    completed_at TEXT,
                    last_position REAL NOT NULL DEFAULT 0,
                    time_spent_seconds INTEGER NOT NULL DEFAULT 0 CHECK (time_spent_seconds >= 0),
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, topic_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS evaluation_results (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    topic_id TEXT NOT NULL,
                    score REAL NOT NULL,
                    max_score REAL NOT NULL CHECK (max_score > 0),
                    percentage REAL NOT NULL,
                    passed INTEGER NOT NULL,
                    answers TEXT NOT NULL,
                    time_spent_seconds INTEGER NOT NULL CHECK (time_spent_seconds >= 0),
                    attempt_number INTEGER NOT NULL CHECK (attempt_number >= 1),
                    submitted_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS bookmarks (
                    user_id INTEGER NOT NULL,
                    topic_id TEXT NOT NULL,
                    note TEXT,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, topic_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_modules_course_order
                    ON modules(course_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_topics_module_order
                    ON topics(module_id, order_index);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_course
                    ON progress(user_id, course_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_evaluation_results_user_topic
                    ON evaluation_results(user_id, topic_id, attempt_number);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (1, ?1)")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
