use sqlx::Row;
use uuid::Uuid;

use academy_core::model::{CourseId, LessonId, QuizId, QuizSubmission};

use super::SqliteRepository;
use crate::repository::{StorageError, SubmissionRepository};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn map_submission_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizSubmission, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id = Uuid::parse_str(&id).map_err(ser)?;
    let quiz_id: String = row.try_get("quiz_id").map_err(ser)?;
    let lesson_id: Option<String> = row.try_get("lesson_id").map_err(ser)?;
    let course_id: String = row.try_get("course_id").map_err(ser)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    let total: i64 = row.try_get("total_questions").map_err(ser)?;
    let submitted_at = row.try_get("submitted_at").map_err(ser)?;
    let passed: bool = row.try_get("passed").map_err(ser)?;

    QuizSubmission::from_persisted(
        id,
        QuizId::new(quiz_id),
        lesson_id.map(LessonId::new),
        CourseId::new(course_id),
        u32::try_from(score).map_err(ser)?,
        u32::try_from(total).map_err(ser)?,
        submitted_at,
        passed,
    )
    .map_err(ser)
}

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append_submission(&self, submission: &QuizSubmission) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO quiz_submissions (
                    id, quiz_id, lesson_id, course_id,
                    score, total_questions, passed, submitted_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(submission.id().to_string())
        .bind(submission.quiz_id().as_str())
        .bind(submission.lesson_id().map(LessonId::as_str))
        .bind(submission.course_id().as_str())
        .bind(i64::from(submission.score()))
        .bind(i64::from(submission.total_questions()))
        .bind(submission.passed())
        .bind(submission.submitted_at())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        tracing::debug!(
            quiz = %submission.quiz_id(),
            passed = submission.passed(),
            "quiz submission appended"
        );
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<QuizSubmission>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, quiz_id, lesson_id, course_id,
                       score, total_questions, passed, submitted_at
                FROM quiz_submissions
                ORDER BY submitted_at DESC, rowid DESC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_submission_row(&row)?);
        }

        Ok(out)
    }
}
