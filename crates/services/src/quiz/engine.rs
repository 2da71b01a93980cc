use std::collections::BTreeMap;
use std::fmt;

use academy_core::model::{Question, Quiz, QuizScore};

use crate::error::QuizError;

//
// ─── WIZARD VIEWS ──────────────────────────────────────────────────────────────
//

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionProgress {
    /// 0-based index of the question currently shown.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub is_submitted: bool,
}

/// What the learner sees after checking an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCheck {
    pub correct: bool,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory question-by-question wizard over one quiz.
///
/// Questions are shown one at a time; answers are recorded into a map keyed
/// by the global question index, so the final score is computed over the
/// whole quiz even though the learner only ever sees one question. Nothing
/// here touches storage — abandoning a session simply drops it, and the
/// workflow layer persists outcomes only once the session is submitted.
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    selected: Option<usize>,
    checked: bool,
    answers: BTreeMap<usize, usize>,
    outcome: Option<QuizScore>,
}

impl QuizSession {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current: 0,
            selected: None,
            checked: false,
            answers: BTreeMap::new(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// The question currently shown, or `None` once submitted.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_submitted() {
            return None;
        }
        self.quiz.question(self.current)
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<QuizScore> {
        self.outcome
    }

    /// Returns a summary of the current wizard progress.
    #[must_use]
    pub fn progress(&self) -> QuestionProgress {
        QuestionProgress {
            current: self.current,
            total: self.quiz.total_questions(),
            answered: self.answers.len(),
            is_submitted: self.is_submitted(),
        }
    }

    /// Selects an option for the current question. Re-selection is allowed
    /// until the answer is checked.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` after submission,
    /// `QuizError::AlreadyChecked` once the answer is revealed, or
    /// `QuizError::OptionOutOfRange` for an impossible option index.
    pub fn select_option(&mut self, option: usize) -> Result<(), QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.checked {
            return Err(QuizError::AlreadyChecked);
        }
        let options = self
            .current_question()
            .map_or(0, |question| question.options.len());
        if option >= options {
            return Err(QuizError::OptionOutOfRange { option, options });
        }

        self.selected = Some(option);
        Ok(())
    }

    /// Checks the selected option against the correct one and records the
    /// answer under the global question index.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSelection` when nothing is selected — the UI is
    /// expected to keep the check action disabled until a selection exists.
    pub fn check_answer(&mut self) -> Result<AnswerCheck, QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.checked {
            return Err(QuizError::AlreadyChecked);
        }
        let selected = self.selected.ok_or(QuizError::NoSelection)?;
        let Some(question) = self.quiz.question(self.current) else {
            return Err(QuizError::AlreadySubmitted);
        };

        self.answers.insert(self.current, selected);
        self.checked = true;

        Ok(AnswerCheck {
            correct: question.is_correct(selected),
            correct_option: question.correct_option,
            explanation: question.explanation.clone(),
        })
    }

    /// Advances to the next question, or scores the quiz when the checked
    /// question was the last one.
    ///
    /// Returns `Some(score)` exactly once, on the transition to submitted.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotChecked` if the current answer has not been
    /// checked, `QuizError::AlreadySubmitted` after submission.
    pub fn next_question(&mut self) -> Result<Option<QuizScore>, QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        if !self.checked {
            return Err(QuizError::NotChecked);
        }

        if self.current + 1 < self.quiz.total_questions() {
            self.current += 1;
            self.selected = None;
            self.checked = false;
            return Ok(None);
        }

        let score = self.quiz.grade(&self.answers);
        self.outcome = Some(score);
        Ok(Some(score))
    }

    /// Clears all answers and returns to the first question.
    ///
    /// Only the in-memory run is reset; whether a previous pass survives is
    /// the store's concern, and its pass flag is one-way.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` while the quiz is still in
    /// progress.
    pub fn retake(&mut self) -> Result<(), QuizError> {
        if !self.is_submitted() {
            return Err(QuizError::NotSubmitted);
        }

        self.current = 0;
        self.selected = None;
        self.checked = false;
        self.answers.clear();
        self.outcome = None;
        Ok(())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("checked", &self.checked)
            .field("answers_len", &self.answers.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
