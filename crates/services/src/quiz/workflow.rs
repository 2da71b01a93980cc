use std::sync::Arc;

use academy_core::Clock;
use academy_core::model::{Course, CourseId, LessonId, Quiz, QuizId, QuizScore, QuizSubmission};
use storage::repository::{ProgressRepository, SubmissionRepository};

use crate::catalog::{CatalogService, CourseProvider};
use crate::error::QuizError;
use super::engine::QuizSession;

//
// ─── QUIZ RUN ──────────────────────────────────────────────────────────────────
//

/// One learner attempt at a quiz, carrying the scope the submission record
/// needs (course, and lesson unless this is a final assessment).
pub struct QuizRun {
    session: QuizSession,
    course_id: CourseId,
    /// `None` for a course-level final assessment.
    lesson_id: Option<LessonId>,
    recorded: bool,
}

impl QuizRun {
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// The mutable wizard, for selection and checking. Advancement goes
    /// through [`QuizLoopService::next_question`] so outcomes persist.
    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> Option<&LessonId> {
        self.lesson_id.as_ref()
    }

    #[must_use]
    pub fn is_final_assessment(&self) -> bool {
        self.lesson_id.is_none()
    }

    /// The lesson id the pass flag is keyed by. A final assessment gates
    /// through its synthetic sequence entry, whose id equals the quiz id.
    fn gate_lesson(&self) -> LessonId {
        self.lesson_id
            .clone()
            .unwrap_or_else(|| LessonId::from(self.session.quiz().id()))
    }
}

//
// ─── QUIZ LOOP SERVICE ─────────────────────────────────────────────────────────
//

/// Orchestrates quiz runs against storage: fetches definitions, drives the
/// wizard, and persists each submitted outcome exactly once.
///
/// Nothing is written before a run reaches its verdict, so abandoning a
/// quiz mid-way leaves no trace. The store's pass flag is one-way by
/// product decision: a failing retake appends to the submission log but
/// never revokes an earlier pass.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    catalog: CatalogService,
    progress: Arc<dyn ProgressRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        provider: Arc<dyn CourseProvider>,
        progress: Arc<dyn ProgressRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            clock,
            catalog: CatalogService::new(provider),
            progress,
            submissions,
        }
    }

    /// Starts a run for the quiz attached to a lesson. Quiz and lesson
    /// share an id in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Catalog` if the quiz cannot be fetched or fails
    /// validation.
    pub async fn start_lesson_quiz(
        &self,
        course: &Course,
        lesson: &LessonId,
    ) -> Result<QuizRun, QuizError> {
        let quiz = self
            .catalog
            .load_quiz(&QuizId::new(lesson.as_str()))
            .await?;
        Ok(self.start_with_quiz(course, Some(lesson.clone()), quiz))
    }

    /// Starts a run for the course-level final assessment.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoFinalAssessment` if the course has none, or
    /// `QuizError::Catalog` for fetch and validation failures.
    pub async fn start_final_assessment(&self, course: &Course) -> Result<QuizRun, QuizError> {
        let quiz_id = course.final_quiz().ok_or(QuizError::NoFinalAssessment)?;
        let quiz = self.catalog.load_quiz(quiz_id).await?;
        Ok(self.start_with_quiz(course, None, quiz))
    }

    /// Starts a run from an already-loaded quiz definition.
    #[must_use]
    pub fn start_with_quiz(
        &self,
        course: &Course,
        lesson: Option<LessonId>,
        quiz: Quiz,
    ) -> QuizRun {
        QuizRun {
            session: QuizSession::new(quiz),
            course_id: course.id().clone(),
            lesson_id: lesson,
            recorded: false,
        }
    }

    /// Advances the wizard and, on the transition to submitted, records the
    /// submission and any earned pass flag.
    ///
    /// # Errors
    ///
    /// Propagates wizard errors, and `QuizError::Storage` when persisting
    /// the outcome fails (retry via [`Self::finalize`]).
    pub async fn next_question(&self, run: &mut QuizRun) -> Result<Option<QuizScore>, QuizError> {
        let outcome = run.session.next_question()?;

        if outcome.is_some() {
            self.record_outcome(run).await?;
        }

        Ok(outcome)
    }

    /// Retry persistence for a submitted run whose final write failed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` if the run has no verdict yet, and
    /// `QuizError::Storage` if persistence fails again.
    pub async fn finalize(&self, run: &mut QuizRun) -> Result<QuizScore, QuizError> {
        let score = run.session.outcome().ok_or(QuizError::NotSubmitted)?;
        self.record_outcome(run).await?;
        Ok(score)
    }

    /// Clears the wizard for another attempt. The next submitted outcome
    /// will be recorded again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` while the current run is still in
    /// progress.
    pub fn retake(&self, run: &mut QuizRun) -> Result<(), QuizError> {
        run.session.retake()?;
        run.recorded = false;
        Ok(())
    }

    async fn record_outcome(&self, run: &mut QuizRun) -> Result<(), QuizError> {
        if run.recorded {
            return Ok(());
        }
        let Some(score) = run.session.outcome() else {
            return Err(QuizError::NotSubmitted);
        };

        let submission = QuizSubmission::new(
            run.session.quiz().id().clone(),
            run.lesson_id.clone(),
            run.course_id.clone(),
            score,
            self.clock.now(),
        );
        self.submissions.append_submission(&submission).await?;

        if score.passed {
            self.progress.mark_quiz_passed(&run.gate_lesson()).await?;
        }
        run.recorded = true;

        tracing::debug!(
            quiz = %run.session.quiz().id(),
            score = score.score,
            total = score.total,
            passed = score.passed,
            "quiz outcome recorded"
        );
        Ok(())
    }
}
