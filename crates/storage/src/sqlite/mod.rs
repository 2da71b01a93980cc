use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{ProgressRepository, Storage, SubmissionRepository};

mod migrate;
mod progress_repo;
mod submission_repo;

/// SQLite-backed progress store. One local database per learner profile.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// if the setup pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Open an in-memory database, for tests and prototyping.
    ///
    /// SQLite drops an in-memory database when its last connection closes,
    /// so the pool is pinned to one long-lived connection.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established.
    pub async fn connect_in_memory() -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        Self::from_repo(repo).await
    }

    /// Build a `Storage` over an in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite_in_memory() -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect_in_memory().await?;
        Self::from_repo(repo).await
    }

    async fn from_repo(repo: SqliteRepository) -> Result<Self, SqliteInitError> {
        repo.migrate().await?;
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(repo);
        Ok(Self {
            progress,
            submissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::{CourseId, CourseSlug, LessonId, QuizId, QuizScore, QuizSubmission};
    use academy_core::time::fixed_now;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    async fn memory_storage() -> Storage {
        Storage::sqlite_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn flags_round_trip_and_stay_one_way() {
        let storage = memory_storage().await;
        let lesson = LessonId::new("l1");

        assert!(!storage.progress.is_completed(&lesson).await.unwrap());
        storage.progress.mark_completed(&lesson).await.unwrap();
        storage.progress.mark_completed(&lesson).await.unwrap();
        assert!(storage.progress.is_completed(&lesson).await.unwrap());

        storage.progress.mark_quiz_passed(&lesson).await.unwrap();
        assert!(storage.progress.is_quiz_passed(&lesson).await.unwrap());

        let slug = CourseSlug::new("course-one");
        storage.progress.mark_course_started(&slug).await.unwrap();
        storage.progress.mark_course_started(&slug).await.unwrap();
        assert!(storage.progress.is_course_started(&slug).await.unwrap());
    }

    #[tokio::test]
    async fn watch_progress_round_trips() {
        let storage = memory_storage().await;
        let lesson = LessonId::new("l1");

        assert_eq!(storage.progress.watch_progress(&lesson).await.unwrap(), 0.0);
        storage
            .progress
            .set_watch_progress(&lesson, 62.5)
            .await
            .unwrap();
        assert_eq!(
            storage.progress.watch_progress(&lesson).await.unwrap(),
            62.5
        );
    }

    #[tokio::test]
    async fn submissions_persist_and_list_newest_first() {
        let storage = memory_storage().await;

        let older = QuizSubmission::new(
            QuizId::new("qz"),
            Some(LessonId::new("l1")),
            CourseId::new("c1"),
            QuizScore::from_counts(3, 5),
            fixed_now(),
        );
        let newer = QuizSubmission::new(
            QuizId::new("qz"),
            Some(LessonId::new("l1")),
            CourseId::new("c1"),
            QuizScore::from_counts(4, 5),
            fixed_now() + chrono::Duration::minutes(5),
        );

        storage.submissions.append_submission(&older).await.unwrap();
        storage.submissions.append_submission(&newer).await.unwrap();

        let listed = storage.submissions.list_submissions().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), newer.id());
        assert!(listed[0].passed());
        assert_eq!(listed[1].score(), 3);
    }

    #[tokio::test]
    async fn snapshot_reads_all_requested_lessons_in_one_pass() {
        use academy_core::model::ProgressView;

        let storage = memory_storage().await;
        storage
            .progress
            .mark_completed(&LessonId::new("a"))
            .await
            .unwrap();
        storage
            .progress
            .set_watch_progress(&LessonId::new("b"), 40.0)
            .await
            .unwrap();

        let snapshot = storage
            .progress
            .snapshot(&[LessonId::new("a"), LessonId::new("b"), LessonId::new("c")])
            .await
            .unwrap();

        assert!(snapshot.is_completed(&LessonId::new("a")));
        assert_eq!(snapshot.watch_progress(&LessonId::new("b")), 40.0);
        assert!(!snapshot.is_completed(&LessonId::new("c")));
    }
}
