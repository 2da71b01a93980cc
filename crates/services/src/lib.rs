#![forbid(unsafe_code)]

//! Orchestration layer of the course engine: the catalog boundary, the quiz
//! wizard and its persisted workflow, the learner progress sink, and the
//! dashboard read models.

pub mod catalog;
pub mod error;
pub mod progress_service;
pub mod quiz;
pub mod stats_service;

pub use academy_core::Clock;

pub use catalog::{CatalogService, CourseProvider, HttpCourseProvider, StaticCourseProvider};
pub use error::{CatalogError, ProgressError, QuizError, StatsError};
pub use progress_service::{LessonAccess, ProgressService, WatchUpdate};
pub use quiz::{AnswerCheck, QuestionProgress, QuizLoopService, QuizRun, QuizSession};
pub use stats_service::StatsService;
