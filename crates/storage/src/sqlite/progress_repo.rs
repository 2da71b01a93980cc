use chrono::Utc;
use sqlx::Row;

use academy_core::model::{CourseSlug, LessonId, LessonProgress, ProgressSnapshot};

use super::SqliteRepository;
use crate::repository::{ProgressRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Decodes one lesson_progress row, defaulting any column that fails to
/// decode: a damaged record reads as not-started instead of breaking every
/// render path that touches it.
fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> LessonProgress {
    let watch_progress = row
        .try_get::<f64, _>("watch_progress")
        .map(|value| value as f32)
        .unwrap_or_else(|e| {
            tracing::warn!("unreadable watch_progress, defaulting to 0: {e}");
            0.0
        });
    let completed = row.try_get::<bool, _>("completed").unwrap_or(false);
    let quiz_passed = row.try_get::<bool, _>("quiz_passed").unwrap_or(false);

    LessonProgress {
        watch_progress,
        completed,
        quiz_passed,
    }
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn watch_progress(&self, lesson: &LessonId) -> Result<f32, StorageError> {
        let row = sqlx::query(
            r"
                SELECT watch_progress, completed, quiz_passed
                FROM lesson_progress
                WHERE lesson_id = ?1
            ",
        )
        .bind(lesson.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        Ok(row.map_or(0.0, |row| map_progress_row(&row).watch_progress))
    }

    async fn set_watch_progress(&self, lesson: &LessonId, percent: f32) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lesson_progress (lesson_id, watch_progress)
                VALUES (?1, ?2)
                ON CONFLICT(lesson_id)
                    DO UPDATE SET watch_progress = excluded.watch_progress
            ",
        )
        .bind(lesson.as_str())
        .bind(f64::from(percent))
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn is_completed(&self, lesson: &LessonId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT completed FROM lesson_progress WHERE lesson_id = ?1")
            .bind(lesson.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        Ok(row.is_some_and(|row| row.try_get::<bool, _>("completed").unwrap_or(false)))
    }

    async fn mark_completed(&self, lesson: &LessonId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lesson_progress (lesson_id, completed)
                VALUES (?1, 1)
                ON CONFLICT(lesson_id) DO UPDATE SET completed = 1
            ",
        )
        .bind(lesson.as_str())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        tracing::debug!(lesson = %lesson, "lesson marked completed");
        Ok(())
    }

    async fn is_quiz_passed(&self, lesson: &LessonId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT quiz_passed FROM lesson_progress WHERE lesson_id = ?1")
            .bind(lesson.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        Ok(row.is_some_and(|row| row.try_get::<bool, _>("quiz_passed").unwrap_or(false)))
    }

    async fn mark_quiz_passed(&self, lesson: &LessonId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lesson_progress (lesson_id, quiz_passed)
                VALUES (?1, 1)
                ON CONFLICT(lesson_id) DO UPDATE SET quiz_passed = 1
            ",
        )
        .bind(lesson.as_str())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        tracing::debug!(lesson = %lesson, "quiz pass recorded");
        Ok(())
    }

    async fn is_course_started(&self, slug: &CourseSlug) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM course_started WHERE course_slug = ?1")
            .bind(slug.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        Ok(row.is_some())
    }

    async fn mark_course_started(&self, slug: &CourseSlug) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO course_started (course_slug, started_at)
                VALUES (?1, ?2)
                ON CONFLICT(course_slug) DO NOTHING
            ",
        )
        .bind(slug.as_str())
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn snapshot(&self, lessons: &[LessonId]) -> Result<ProgressSnapshot, StorageError> {
        if lessons.is_empty() {
            return Ok(ProgressSnapshot::new());
        }

        let mut sql = String::from(
            r"
                SELECT lesson_id, watch_progress, completed, quiz_passed
                FROM lesson_progress
                WHERE lesson_id IN (
            ",
        );
        for i in 0..lessons.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push(')');

        let mut query = sqlx::query(&sql);
        for lesson in lessons {
            query = query.bind(lesson.as_str());
        }

        let rows = query.fetch_all(self.pool()).await.map_err(conn)?;

        let mut snapshot = ProgressSnapshot::new();
        for row in rows {
            let lesson_id: String = row.try_get("lesson_id").map_err(conn)?;
            snapshot.insert(LessonId::new(lesson_id), map_progress_row(&row));
        }

        Ok(snapshot)
    }
}
