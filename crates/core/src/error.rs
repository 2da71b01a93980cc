use thiserror::Error;

use crate::access::AccessError;
use crate::model::{CourseError, QuizDefinitionError, SubmissionError};

/// Umbrella error for the core domain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    QuizDefinition(#[from] QuizDefinitionError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Access(#[from] AccessError),
}
