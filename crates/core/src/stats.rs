//! Progress aggregation for dashboards: per-course completion and
//! learner-wide rollups.

use crate::model::{ProgressView, QuizSubmission};
use crate::sequence::LessonSequence;

//
// ─── COURSE STATS ──────────────────────────────────────────────────────────────
//

/// Completion statistics for a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseStats {
    pub total_lessons: usize,
    pub completed_lessons: usize,
    /// Rounded 0–100. A course with no lessons reports 0, not an error.
    pub percent_complete: u8,
}

impl CourseStats {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.percent_complete == 100
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.percent_complete > 0 && self.percent_complete < 100
    }
}

/// Aggregates completion state over a flattened course.
#[must_use]
pub fn course_stats(sequence: &LessonSequence, progress: &impl ProgressView) -> CourseStats {
    let total_lessons = sequence.len();
    let completed_lessons = sequence
        .iter()
        .filter(|entry| progress.is_completed(&entry.lesson_id))
        .count();

    let percent_complete = if total_lessons == 0 {
        0
    } else {
        ((completed_lessons as f64 / total_lessons as f64) * 100.0).round() as u8
    };

    CourseStats {
        total_lessons,
        completed_lessons,
        percent_complete,
    }
}

//
// ─── LEARNER STATS ─────────────────────────────────────────────────────────────
//

/// Rollup across all of a learner's started courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LearnerStats {
    pub courses_completed: usize,
    pub courses_in_progress: usize,
    pub total_quizzes: usize,
    /// Mean of score/total per submission, rounded; 0 with no submissions.
    pub average_quiz_score_percent: u8,
}

/// Combines per-course stats with the quiz submission log.
///
/// `courses` should already be restricted to started courses; membership is
/// the caller's concern (the started flag lives in the store, not here).
#[must_use]
pub fn learner_stats(courses: &[CourseStats], submissions: &[QuizSubmission]) -> LearnerStats {
    let courses_completed = courses.iter().filter(|c| c.is_completed()).count();
    let courses_in_progress = courses.iter().filter(|c| c.is_in_progress()).count();

    let total_quizzes = submissions.len();
    let average_quiz_score_percent = if submissions.is_empty() {
        0
    } else {
        let sum: f64 = submissions.iter().map(QuizSubmission::percent).sum();
        (sum / submissions.len() as f64).round() as u8
    };

    LearnerStats {
        courses_completed,
        courses_in_progress,
        total_quizzes,
        average_quiz_score_percent,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
