use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use academy_core::model::{CourseSlug, LessonId, LessonProgress, ProgressSnapshot, QuizSubmission};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-learner progress persistence.
///
/// All flag writes are idempotent, and the completion and quiz-pass flags
/// are one-way: no unmark operation exists. Reads default to the not-started
/// state when a record is missing, so every render path has an answer even
/// with zero history. A write is visible to the very next read.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Watched/read share of a lesson, 0–100. Missing records read as 0.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for medium failures, never for absence.
    async fn watch_progress(&self, lesson: &LessonId) -> Result<f32, StorageError>;

    /// Stores the latest watch position. Callers are expected to only ever
    /// increase it; the store itself does not enforce monotonicity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn set_watch_progress(&self, lesson: &LessonId, percent: f32) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` only for medium failures.
    async fn is_completed(&self, lesson: &LessonId) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn mark_completed(&self, lesson: &LessonId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` only for medium failures.
    async fn is_quiz_passed(&self, lesson: &LessonId) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn mark_quiz_passed(&self, lesson: &LessonId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` only for medium failures.
    async fn is_course_started(&self, slug: &CourseSlug) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn mark_course_started(&self, slug: &CourseSlug) -> Result<(), StorageError>;

    /// Reads the state of the given lessons in one pass, for the pure
    /// evaluators. Lessons without records appear as defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for medium failures.
    async fn snapshot(&self, lessons: &[LessonId]) -> Result<ProgressSnapshot, StorageError>;
}

/// Append-only quiz submission log.
///
/// Reporting only: gating reads the boolean pass flags on
/// [`ProgressRepository`], never this log.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be appended.
    async fn append_submission(&self, submission: &QuizSubmission) -> Result<(), StorageError>;

    /// All submissions, newest first by submission time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for medium failures.
    async fn list_submissions(&self) -> Result<Vec<QuizSubmission>, StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    records: HashMap<LessonId, LessonProgress>,
    started: HashSet<CourseSlug>,
    submissions: Vec<QuizSubmission>,
}

/// Simple in-memory progress store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressStore {
    async fn watch_progress(&self, lesson: &LessonId) -> Result<f32, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .get(lesson)
            .map_or(0.0, |record| record.watch_progress))
    }

    async fn set_watch_progress(&self, lesson: &LessonId, percent: f32) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .records
            .entry(lesson.clone())
            .or_default()
            .watch_progress = percent;
        Ok(())
    }

    async fn is_completed(&self, lesson: &LessonId) -> Result<bool, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .get(lesson)
            .is_some_and(|record| record.completed))
    }

    async fn mark_completed(&self, lesson: &LessonId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.records.entry(lesson.clone()).or_default().completed = true;
        Ok(())
    }

    async fn is_quiz_passed(&self, lesson: &LessonId) -> Result<bool, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .get(lesson)
            .is_some_and(|record| record.quiz_passed))
    }

    async fn mark_quiz_passed(&self, lesson: &LessonId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.records.entry(lesson.clone()).or_default().quiz_passed = true;
        Ok(())
    }

    async fn is_course_started(&self, slug: &CourseSlug) -> Result<bool, StorageError> {
        let guard = self.lock()?;
        Ok(guard.started.contains(slug))
    }

    async fn mark_course_started(&self, slug: &CourseSlug) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.started.insert(slug.clone());
        Ok(())
    }

    async fn snapshot(&self, lessons: &[LessonId]) -> Result<ProgressSnapshot, StorageError> {
        let guard = self.lock()?;
        Ok(lessons
            .iter()
            .filter_map(|lesson| {
                guard
                    .records
                    .get(lesson)
                    .map(|record| (lesson.clone(), *record))
            })
            .collect())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryProgressStore {
    async fn append_submission(&self, submission: &QuizSubmission) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.submissions.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<QuizSubmission>, StorageError> {
        let guard = self.lock()?;
        let mut submissions = guard.submissions.clone();
        submissions.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));
        Ok(submissions)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the progress and submission repositories behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryProgressStore::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(store);
        Self {
            progress,
            submissions,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
