use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, CourseSlug, LessonId, ModuleId, QuizId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course slug cannot be empty")]
    EmptySlug,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Kind of a single lesson within a course.
///
/// Only `Quiz` and `FinalAssessment` lessons gate progression on a quiz pass;
/// every other kind is cleared by content completion alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonKind {
    Video,
    Guide,
    Quiz,
    Workshop,
    Assignment,
    Reading,
    FinalAssessment,
}

impl LessonKind {
    /// Parses the catalog's lesson-type string. Unknown values yield `None`;
    /// the caller decides the fallback.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "guide" => Some(Self::Guide),
            "quiz" => Some(Self::Quiz),
            "workshop" => Some(Self::Workshop),
            "assignment" => Some(Self::Assignment),
            "reading" => Some(Self::Reading),
            "final-assessment" => Some(Self::FinalAssessment),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Guide => "guide",
            Self::Quiz => "quiz",
            Self::Workshop => "workshop",
            Self::Assignment => "assignment",
            Self::Reading => "reading",
            Self::FinalAssessment => "final-assessment",
        }
    }

    /// True when advancing past a lesson of this kind additionally requires
    /// its quiz to be passed.
    #[must_use]
    pub fn carries_quiz(self) -> bool {
        matches!(self, Self::Quiz | Self::FinalAssessment)
    }
}

/// A single unit of course content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    /// Position within the containing module or topic, not globally unique.
    pub order: u32,
    pub kind: LessonKind,
    pub media: Option<Url>,
    /// Author-set intent flag from the catalog. Display-only; the computed
    /// lock state comes from the access evaluator, never from this field.
    pub locked_by_author: bool,
}

impl Lesson {
    #[must_use]
    pub fn new(id: LessonId, title: impl Into<String>, order: u32, kind: LessonKind) -> Self {
        Self {
            id,
            title: title.into(),
            order,
            kind,
            media: None,
            locked_by_author: false,
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: Url) -> Self {
        self.media = Some(media);
        self
    }
}

//
// ─── CURRICULUM ────────────────────────────────────────────────────────────────
//

/// A named group of lessons inside a topic-shaped module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub order: u32,
    pub lessons: Vec<Lesson>,
}

/// The children of a curriculum module.
///
/// The catalog serves three shapes: lessons grouped under topics, lessons
/// attached directly to the module, or nothing at all. Making the shape a
/// variant keeps "topics XOR direct lessons" out of runtime checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleChildren {
    Topics(Vec<Topic>),
    Lessons(Vec<Lesson>),
    Empty,
}

impl ModuleChildren {
    /// Number of lessons reachable through this module.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        match self {
            Self::Topics(topics) => topics.iter().map(|t| t.lessons.len()).sum(),
            Self::Lessons(lessons) => lessons.len(),
            Self::Empty => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lesson_count() == 0
    }
}

/// One module of a course curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumItem {
    pub id: ModuleId,
    pub title: String,
    pub order: u32,
    pub children: ModuleChildren,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Publication state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseStatus {
    #[default]
    Live,
    ComingSoon,
}

impl CourseStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(Self::Live),
            "coming-soon" => Some(Self::ComingSoon),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::ComingSoon => "coming-soon",
        }
    }
}

/// A course as loaded from the catalog. Immutable for the session.
///
/// Curriculum modules are stored as received; they are not guaranteed to be
/// pre-sorted. Ordering is applied when the curriculum is flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    slug: CourseSlug,
    title: String,
    status: CourseStatus,
    curriculum: Vec<CurriculumItem>,
    final_quiz: Option<QuizId>,
}

impl Course {
    /// Builds a course from normalized catalog data.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title or slug is blank.
    pub fn new(
        id: CourseId,
        slug: CourseSlug,
        title: impl Into<String>,
        status: CourseStatus,
        curriculum: Vec<CurriculumItem>,
        final_quiz: Option<QuizId>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if slug.as_str().trim().is_empty() {
            return Err(CourseError::EmptySlug);
        }

        Ok(Self {
            id,
            slug,
            title,
            status,
            curriculum,
            final_quiz,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn slug(&self) -> &CourseSlug {
        &self.slug
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn status(&self) -> CourseStatus {
        self.status
    }

    #[must_use]
    pub fn curriculum(&self) -> &[CurriculumItem] {
        &self.curriculum
    }

    #[must_use]
    pub fn final_quiz(&self) -> Option<&QuizId> {
        self.final_quiz.as_ref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
