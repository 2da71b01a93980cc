use std::sync::Arc;

use academy_core::access;
use academy_core::model::{Course, LessonId, LessonKind, ProgressView};
use academy_core::sequence::{SequencedLesson, flatten};
use storage::repository::ProgressRepository;

use crate::error::ProgressError;

/// Minimum forward movement, in percentage points, before a playback tick
/// is written through. The 100 mark always persists.
const DEFAULT_WATCH_STEP: f32 = 5.0;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Per-lesson state a curriculum page renders: position, computed lock
/// state, and the learner's progress against it.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonAccess {
    pub lesson_id: LessonId,
    pub position: usize,
    pub kind: LessonKind,
    pub accessible: bool,
    pub completed: bool,
    pub watch_progress: f32,
}

/// What happened to a reported playback tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchUpdate {
    Persisted(f32),
    /// Below the throttle step, or not a forward movement.
    Skipped,
}

//
// ─── PROGRESS SERVICE ──────────────────────────────────────────────────────────
//

/// Orchestrates learner progress: a throttled sink for watch events,
/// one-way completion marks, and accessibility queries that load a single
/// snapshot per call so the pure evaluators stay deterministic.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    watch_step: f32,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            watch_step: DEFAULT_WATCH_STEP,
        }
    }

    /// Overrides the throttle step. A step of 0 writes every forward tick.
    #[must_use]
    pub fn with_watch_step(mut self, step: f32) -> Self {
        self.watch_step = step.max(0.0);
        self
    }

    /// Reports a playback/read position for a lesson.
    ///
    /// The raw event stream fires on every player tick; only forward
    /// movement of at least the configured step is written through, and the
    /// completion mark (100) always is. Values clamp to 0–100.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the write fails.
    pub async fn report_watch(
        &self,
        lesson: &LessonId,
        percent: f32,
    ) -> Result<WatchUpdate, ProgressError> {
        let percent = percent.clamp(0.0, 100.0);
        let current = self.progress.watch_progress(lesson).await?;

        if percent <= current {
            return Ok(WatchUpdate::Skipped);
        }
        if percent < 100.0 && percent - current < self.watch_step {
            return Ok(WatchUpdate::Skipped);
        }

        self.progress.set_watch_progress(lesson, percent).await?;
        Ok(WatchUpdate::Persisted(percent))
    }

    /// Opens a lesson: verifies it is accessible and stamps the course
    /// started flag (idempotent) on the way through.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::LessonLocked` when the lock evaluator says
    /// no, `ProgressError::Access` for a lesson the course does not
    /// contain.
    pub async fn open_lesson(&self, course: &Course, lesson: &LessonId) -> Result<(), ProgressError> {
        let sequence = flatten(course);
        let snapshot = self.progress.snapshot(&sequence.lesson_ids()).await?;

        if !access::is_accessible(lesson, &sequence, &snapshot)? {
            return Err(ProgressError::LessonLocked(lesson.clone()));
        }

        self.progress.mark_course_started(course.slug()).await?;
        Ok(())
    }

    /// Marks a lesson's content as completed. Idempotent and one-way.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the write fails.
    pub async fn complete_lesson(&self, lesson: &LessonId) -> Result<(), ProgressError> {
        self.progress.mark_completed(lesson).await?;
        Ok(())
    }

    /// Whether a single lesson is currently accessible.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Access` for an unknown lesson id.
    pub async fn is_lesson_accessible(
        &self,
        course: &Course,
        lesson: &LessonId,
    ) -> Result<bool, ProgressError> {
        let sequence = flatten(course);
        let snapshot = self.progress.snapshot(&sequence.lesson_ids()).await?;
        Ok(access::is_accessible(lesson, &sequence, &snapshot)?)
    }

    /// Lock state and progress for every lesson of a course, in sequence
    /// order, from one snapshot read.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the snapshot cannot be read.
    pub async fn course_access(&self, course: &Course) -> Result<Vec<LessonAccess>, ProgressError> {
        let sequence = flatten(course);
        let snapshot = self.progress.snapshot(&sequence.lesson_ids()).await?;
        let accessible = access::accessible_positions(&sequence, &snapshot);

        Ok(sequence
            .iter()
            .zip(accessible)
            .map(|(entry, accessible)| LessonAccess {
                lesson_id: entry.lesson_id.clone(),
                position: entry.position,
                kind: entry.kind,
                accessible,
                completed: snapshot.is_completed(&entry.lesson_id),
                watch_progress: snapshot.watch_progress(&entry.lesson_id),
            })
            .collect())
    }

    /// The lesson a learner should continue with: first accessible, not yet
    /// completed. `None` when the course is empty or fully cleared.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the snapshot cannot be read.
    pub async fn resume_position(
        &self,
        course: &Course,
    ) -> Result<Option<SequencedLesson>, ProgressError> {
        let sequence = flatten(course);
        let snapshot = self.progress.snapshot(&sequence.lesson_ids()).await?;
        Ok(access::resume_entry(&sequence, &snapshot).cloned())
    }
}
