use std::sync::Arc;

use academy_core::model::{Course, CourseSlug};
use academy_core::sequence::flatten;
use academy_core::stats::{self, CourseStats, LearnerStats};
use storage::repository::{ProgressRepository, SubmissionRepository};

use crate::error::StatsError;

//
// ─── STATS SERVICE ─────────────────────────────────────────────────────────────
//

/// Read model for dashboards: joins curriculum shape with the progress
/// store and the submission log.
#[derive(Clone)]
pub struct StatsService {
    progress: Arc<dyn ProgressRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            progress,
            submissions,
        }
    }

    /// Completion statistics for one course.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the snapshot cannot be read.
    pub async fn course_stats(&self, course: &Course) -> Result<CourseStats, StatsError> {
        let sequence = flatten(course);
        let snapshot = self.progress.snapshot(&sequence.lesson_ids()).await?;
        Ok(stats::course_stats(&sequence, &snapshot))
    }

    /// Per-course statistics restricted to courses the learner has started.
    ///
    /// Membership in "my courses" comes from the started flag alone; lock
    /// state plays no part here.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` for store failures.
    pub async fn started_course_stats(
        &self,
        courses: &[Course],
    ) -> Result<Vec<(CourseSlug, CourseStats)>, StatsError> {
        let mut out = Vec::new();
        for course in courses {
            if self.progress.is_course_started(course.slug()).await? {
                out.push((course.slug().clone(), self.course_stats(course).await?));
            }
        }
        Ok(out)
    }

    /// Learner-wide rollup across started courses plus the full quiz
    /// submission history.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` for store failures.
    pub async fn learner_stats(&self, courses: &[Course]) -> Result<LearnerStats, StatsError> {
        let started = self.started_course_stats(courses).await?;
        let per_course: Vec<CourseStats> = started.into_iter().map(|(_, stats)| stats).collect();
        let submissions = self.submissions.list_submissions().await?;

        Ok(stats::learner_stats(&per_course, &submissions))
    }
}
