//! Lock evaluation: which lessons a learner may open right now.
//!
//! Pure functions over a [`LessonSequence`] and a [`ProgressView`]. The rule
//! is strict all-previous-complete: a lesson is accessible only when every
//! earlier lesson is completed and every quiz-bearing lesson among them has
//! its quiz passed. Gaps are never permitted, and content completion never
//! substitutes for a required quiz pass.

use thiserror::Error;

use crate::model::{LessonId, ProgressView};
use crate::sequence::{LessonSequence, SequencedLesson};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("lesson {0} is not part of the course sequence")]
    LessonNotFound(LessonId),
}

/// A lesson is cleared when its own gates no longer hold anyone back:
/// content completed, and the quiz passed where the lesson carries one.
fn is_cleared(entry: &SequencedLesson, progress: &impl ProgressView) -> bool {
    progress.is_completed(&entry.lesson_id)
        && (!entry.kind.carries_quiz() || progress.is_quiz_passed(&entry.lesson_id))
}

/// Whether the lesson at `position` is accessible.
///
/// Position 0 is always accessible. An out-of-range position is simply not
/// accessible; this function never fails.
#[must_use]
pub fn is_position_accessible(
    sequence: &LessonSequence,
    progress: &impl ProgressView,
    position: usize,
) -> bool {
    if position >= sequence.len() {
        return false;
    }

    sequence.entries()[..position]
        .iter()
        .all(|entry| is_cleared(entry, progress))
}

/// Whether the given lesson is accessible.
///
/// # Errors
///
/// Returns `AccessError::LessonNotFound` if the lesson is not part of the
/// sequence. The caller decides what a missing lesson means; the evaluator
/// refuses to guess.
pub fn is_accessible(
    lesson: &LessonId,
    sequence: &LessonSequence,
    progress: &impl ProgressView,
) -> Result<bool, AccessError> {
    let position = sequence
        .position_of(lesson)
        .ok_or_else(|| AccessError::LessonNotFound(lesson.clone()))?;

    Ok(is_position_accessible(sequence, progress, position))
}

/// Accessibility of every position in one pass.
///
/// Equivalent to calling [`is_position_accessible`] per position, without
/// re-walking the prefix each time.
#[must_use]
pub fn accessible_positions(sequence: &LessonSequence, progress: &impl ProgressView) -> Vec<bool> {
    let mut open = true;
    sequence
        .iter()
        .map(|entry| {
            let accessible = open;
            open = open && is_cleared(entry, progress);
            accessible
        })
        .collect()
}

/// The entry a learner should resume at: the first accessible lesson that is
/// not yet completed. `None` when the course is empty or fully cleared.
#[must_use]
pub fn resume_entry<'a>(
    sequence: &'a LessonSequence,
    progress: &impl ProgressView,
) -> Option<&'a SequencedLesson> {
    sequence
        .iter()
        .zip(accessible_positions(sequence, progress))
        .find(|(entry, accessible)| *accessible && !progress.is_completed(&entry.lesson_id))
        .map(|(entry, _)| entry)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
