use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::model::ids::{CourseId, LessonId, QuizId};

/// Score percentage required for a passing verdict.
///
/// Applied uniformly to lesson quizzes and course-level final assessments.
pub const PASSING_THRESHOLD_PERCENT: u8 = 80;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDefinitionError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} has no options")]
    NoOptions { index: usize },

    #[error("question {index} marks option {correct} correct but has only {options} options")]
    CorrectOptionOutOfRange {
        index: usize,
        correct: usize,
        options: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submission score ({score}) exceeds question count ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("submission has zero questions")]
    ZeroQuestions,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One multiple-choice question: a prompt, ordered options, and the index of
/// the correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>, options: Vec<String>, correct_option: usize) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_option,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// An immutable quiz definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    questions: Vec<Question>,
}

impl Quiz {
    /// Builds a quiz, validating every question definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizDefinitionError` if there are no questions, a question
    /// has no options, or a correct-option index is out of range.
    pub fn new(id: QuizId, questions: Vec<Question>) -> Result<Self, QuizDefinitionError> {
        if questions.is_empty() {
            return Err(QuizDefinitionError::NoQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(QuizDefinitionError::NoOptions { index });
            }
            if question.correct_option >= question.options.len() {
                return Err(QuizDefinitionError::CorrectOptionOutOfRange {
                    index,
                    correct: question.correct_option,
                    options: question.options.len(),
                });
            }
        }

        Ok(Self { id, questions })
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Scores an answer map (global question index → chosen option).
    ///
    /// Unanswered questions count as wrong. The verdict compares the raw
    /// ratio against the fixed threshold before any display rounding.
    #[must_use]
    pub fn grade(&self, answers: &BTreeMap<usize, usize>) -> QuizScore {
        let score = self
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                answers
                    .get(index)
                    .is_some_and(|chosen| question.is_correct(*chosen))
            })
            .count() as u32;

        QuizScore::from_counts(score, self.questions.len() as u32)
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Outcome of grading one quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub score: u32,
    pub total: u32,
    pub passed: bool,
}

impl QuizScore {
    #[must_use]
    pub fn from_counts(score: u32, total: u32) -> Self {
        let passed = total > 0
            && (f64::from(score) / f64::from(total)) * 100.0
                >= f64::from(PASSING_THRESHOLD_PERCENT);
        Self {
            score,
            total,
            passed,
        }
    }

    /// Score as a rounded 0–100 percentage, for display.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((f64::from(self.score) / f64::from(self.total)) * 100.0).round() as u8
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

/// Append-only record of one graded quiz run.
///
/// The latest pass verdict drives gating via the store's pass flag; the log
/// itself exists for reporting and is never consulted by the lock evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    id: Uuid,
    quiz_id: QuizId,
    /// `None` for a course-level final assessment.
    lesson_id: Option<LessonId>,
    course_id: CourseId,
    score: u32,
    total_questions: u32,
    submitted_at: DateTime<Utc>,
    passed: bool,
}

impl QuizSubmission {
    #[must_use]
    pub fn new(
        quiz_id: QuizId,
        lesson_id: Option<LessonId>,
        course_id: CourseId,
        score: QuizScore,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id,
            lesson_id,
            course_id,
            score: score.score,
            total_questions: score.total,
            submitted_at,
            passed: score.passed,
        }
    }

    /// Rehydrates a submission from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError` if counts do not align.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: Uuid,
        quiz_id: QuizId,
        lesson_id: Option<LessonId>,
        course_id: CourseId,
        score: u32,
        total_questions: u32,
        submitted_at: DateTime<Utc>,
        passed: bool,
    ) -> Result<Self, SubmissionError> {
        if total_questions == 0 {
            return Err(SubmissionError::ZeroQuestions);
        }
        if score > total_questions {
            return Err(SubmissionError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }

        Ok(Self {
            id,
            quiz_id,
            lesson_id,
            course_id,
            score,
            total_questions,
            submitted_at,
            passed,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> Option<&LessonId> {
        self.lesson_id.as_ref()
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Score as a 0–100 percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        (f64::from(self.score) / f64::from(self.total_questions)) * 100.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
