use std::collections::HashMap;

use crate::model::ids::LessonId;

//
// ─── LESSON PROGRESS ───────────────────────────────────────────────────────────
//

/// Per-lesson learner state.
///
/// A missing record is equivalent to the default: nothing watched, nothing
/// completed, no quiz passed. Completion and pass flags are one-way; nothing
/// in the domain exposes an unmark operation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LessonProgress {
    /// Watched/read share of the lesson content, 0–100.
    pub watch_progress: f32,
    pub completed: bool,
    pub quiz_passed: bool,
}

//
// ─── PROGRESS VIEW ─────────────────────────────────────────────────────────────
//

/// Read-only progress lookup consumed by the pure evaluators.
///
/// Implementations must default safely: an unknown lesson reads as
/// not-started rather than failing, so render paths always have an answer.
pub trait ProgressView {
    fn watch_progress(&self, lesson: &LessonId) -> f32;

    fn is_completed(&self, lesson: &LessonId) -> bool;

    fn is_quiz_passed(&self, lesson: &LessonId) -> bool;
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// In-memory progress state for a set of lessons, loaded from the store in
/// one read so lock evaluation and aggregation stay pure and deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    records: HashMap<LessonId, LessonProgress>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record(&self, lesson: &LessonId) -> LessonProgress {
        self.records.get(lesson).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, lesson: LessonId, progress: LessonProgress) {
        self.records.insert(lesson, progress);
    }

    pub fn set_watch_progress(&mut self, lesson: &LessonId, percent: f32) {
        self.records.entry(lesson.clone()).or_default().watch_progress = percent;
    }

    /// Idempotent; there is no way to clear the flag again.
    pub fn mark_completed(&mut self, lesson: &LessonId) {
        self.records.entry(lesson.clone()).or_default().completed = true;
    }

    /// Idempotent; there is no way to clear the flag again.
    pub fn mark_quiz_passed(&mut self, lesson: &LessonId) {
        self.records.entry(lesson.clone()).or_default().quiz_passed = true;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressView for ProgressSnapshot {
    fn watch_progress(&self, lesson: &LessonId) -> f32 {
        self.record(lesson).watch_progress
    }

    fn is_completed(&self, lesson: &LessonId) -> bool {
        self.record(lesson).completed
    }

    fn is_quiz_passed(&self, lesson: &LessonId) -> bool {
        self.record(lesson).quiz_passed
    }
}

impl FromIterator<(LessonId, LessonProgress)> for ProgressSnapshot {
    fn from_iter<I: IntoIterator<Item = (LessonId, LessonProgress)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
