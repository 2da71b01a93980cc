mod engine;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use engine::{AnswerCheck, QuestionProgress, QuizSession};
pub use workflow::{QuizLoopService, QuizRun};
