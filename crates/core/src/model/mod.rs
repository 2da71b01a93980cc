mod course;
mod ids;
mod progress;
mod quiz;

pub use ids::{CourseId, CourseSlug, LessonId, ModuleId, QuizId, TopicId};

pub use course::{
    Course, CourseError, CourseStatus, CurriculumItem, Lesson, LessonKind, ModuleChildren, Topic,
};
pub use progress::{LessonProgress, ProgressSnapshot, ProgressView};
pub use quiz::{
    PASSING_THRESHOLD_PERCENT, Question, Quiz, QuizDefinitionError, QuizScore, QuizSubmission,
    SubmissionError,
};
