//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::access::AccessError;
use academy_core::model::{CourseError, LessonId, QuizDefinitionError};
use storage::repository::StorageError;

/// Errors emitted by the catalog boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course '{0}' not found in catalog")]
    CourseNotFound(String),

    #[error("quiz '{0}' not found in catalog")]
    QuizNotFound(String),

    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    QuizDefinition(#[from] QuizDefinitionError),
}

/// Errors emitted by the quiz engine and workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no option selected")]
    NoSelection,

    #[error("answer already checked; advance to the next question")]
    AlreadyChecked,

    #[error("answer not checked yet")]
    NotChecked,

    #[error("option {option} out of range for a question with {options} options")]
    OptionOutOfRange { option: usize, options: usize },

    #[error("quiz already submitted")]
    AlreadySubmitted,

    #[error("quiz not submitted yet")]
    NotSubmitted,

    #[error("course has no final assessment")]
    NoFinalAssessment,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("lesson {0} is locked")]
    LessonLocked(LessonId),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
