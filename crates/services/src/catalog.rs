//! Catalog boundary: raw course and quiz payloads as the remote store
//! serves them, shape-tolerant normalization into the domain model, and the
//! provider trait the rest of the services consume.
//!
//! The payloads are irregular by design: a module may nest lessons under
//! topics or attach them directly, order indexes may be absent, and lesson
//! types drift as content authors invent new ones. Normalization absorbs all
//! of that here so the core model never sees an optional field.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use academy_core::model::{
    Course, CourseId, CourseSlug, CourseStatus, CurriculumItem, Lesson, LessonId, LessonKind,
    ModuleChildren, ModuleId, Question, Quiz, QuizId, Topic, TopicId,
};

use crate::error::CatalogError;

//
// ─── RAW PAYLOADS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
pub struct RawCourse {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub curriculum: Vec<RawModule>,
    #[serde(default)]
    pub final_quiz_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub topics: Option<Vec<RawTopic>>,
    #[serde(default)]
    pub lessons: Option<Vec<RawLesson>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<RawLesson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: u32,
    #[serde(rename = "type", default)]
    pub lesson_type: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuiz {
    pub id: String,
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

//
// ─── NORMALIZATION ─────────────────────────────────────────────────────────────
//

fn normalize_lesson(raw: RawLesson) -> Lesson {
    let kind = match raw.lesson_type.as_deref() {
        None => LessonKind::Video,
        Some(value) => LessonKind::parse(value).unwrap_or_else(|| {
            tracing::warn!(lesson = %raw.id, "unknown lesson type '{value}', treating as video");
            LessonKind::Video
        }),
    };

    let mut lesson = Lesson::new(LessonId::new(raw.id.clone()), raw.title, raw.order, kind);
    lesson.locked_by_author = raw.is_locked;

    if let Some(value) = raw.media {
        match Url::parse(&value) {
            Ok(url) => lesson = lesson.with_media(url),
            Err(e) => {
                tracing::warn!(lesson = %raw.id, "unusable media reference '{value}': {e}");
            }
        }
    }
    lesson
}

fn normalize_module(raw: RawModule) -> CurriculumItem {
    let topics = raw.topics.unwrap_or_default();
    let lessons = raw.lessons.unwrap_or_default();

    // Topics win when a module somehow carries both shapes; the original
    // portal renders the topical layout and never sums the two.
    let children = if !topics.is_empty() {
        if !lessons.is_empty() {
            tracing::warn!(module = %raw.id, "module has topics and direct lessons, keeping topics");
        }
        ModuleChildren::Topics(
            topics
                .into_iter()
                .map(|topic| Topic {
                    id: TopicId::new(topic.id),
                    title: topic.title,
                    order: topic.order,
                    lessons: topic.lessons.into_iter().map(normalize_lesson).collect(),
                })
                .collect(),
        )
    } else if !lessons.is_empty() {
        ModuleChildren::Lessons(lessons.into_iter().map(normalize_lesson).collect())
    } else {
        ModuleChildren::Empty
    };

    CurriculumItem {
        id: ModuleId::new(raw.id),
        title: raw.title,
        order: raw.order,
        children,
    }
}

/// Normalizes a raw course payload into the domain model.
///
/// # Errors
///
/// Returns `CatalogError` if the payload fails domain validation (blank
/// title or slug).
pub fn normalize_course(raw: RawCourse) -> Result<Course, CatalogError> {
    let status = match raw.status.as_deref() {
        None => CourseStatus::default(),
        Some(value) => CourseStatus::parse(value).unwrap_or_else(|| {
            tracing::warn!(course = %raw.id, "unknown course status '{value}', treating as live");
            CourseStatus::default()
        }),
    };

    let curriculum = raw.curriculum.into_iter().map(normalize_module).collect();

    Ok(Course::new(
        CourseId::new(raw.id),
        CourseSlug::new(raw.slug),
        raw.title,
        status,
        curriculum,
        raw.final_quiz_id.map(QuizId::new),
    )?)
}

/// Normalizes a raw quiz payload into the domain model.
///
/// # Errors
///
/// Returns `CatalogError` if the quiz definition is invalid (no questions,
/// empty option lists, out-of-range correct answers).
pub fn normalize_quiz(raw: RawQuiz) -> Result<Quiz, CatalogError> {
    let questions = raw
        .questions
        .into_iter()
        .map(|question| {
            let mut normalized = Question::new(
                question.question,
                question.options,
                question.correct_answer,
            );
            if let Some(explanation) = question.explanation {
                normalized = normalized.with_explanation(explanation);
            }
            normalized
        })
        .collect();

    Ok(Quiz::new(QuizId::new(raw.id), questions)?)
}

//
// ─── PROVIDERS ─────────────────────────────────────────────────────────────────
//

/// Fetch boundary for course and quiz payloads.
///
/// The core never performs I/O; implementations of this trait are the only
/// place the remote store is spoken to.
#[async_trait]
pub trait CourseProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` for an unknown slug, or a
    /// transport error.
    async fn fetch_course(&self, slug: &CourseSlug) -> Result<RawCourse, CatalogError>;

    /// Fetches the quiz attached to a lesson (quiz id = lesson id) or a
    /// course-level final assessment by its own id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::QuizNotFound` for an unknown id, or a
    /// transport error.
    async fn fetch_quiz(&self, id: &QuizId) -> Result<RawQuiz, CatalogError>;
}

/// HTTP-backed provider for the portal's content API.
#[derive(Clone)]
pub struct HttpCourseProvider {
    client: Client,
    base_url: String,
}

impl HttpCourseProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CourseProvider for HttpCourseProvider {
    async fn fetch_course(&self, slug: &CourseSlug) -> Result<RawCourse, CatalogError> {
        let response = self
            .client
            .get(self.endpoint(&format!("courses/{slug}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::CourseNotFound(slug.as_str().to_owned()));
        }
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_quiz(&self, id: &QuizId) -> Result<RawQuiz, CatalogError> {
        let response = self
            .client
            .get(self.endpoint(&format!("quizzes/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::QuizNotFound(id.as_str().to_owned()));
        }
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

/// Fixture-backed provider for tests and offline development.
#[derive(Clone, Default)]
pub struct StaticCourseProvider {
    courses: HashMap<CourseSlug, RawCourse>,
    quizzes: HashMap<QuizId, RawQuiz>,
}

impl StaticCourseProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_course(mut self, raw: RawCourse) -> Self {
        self.courses.insert(CourseSlug::new(raw.slug.clone()), raw);
        self
    }

    #[must_use]
    pub fn with_quiz(mut self, raw: RawQuiz) -> Self {
        self.quizzes.insert(QuizId::new(raw.id.clone()), raw);
        self
    }
}

#[async_trait]
impl CourseProvider for StaticCourseProvider {
    async fn fetch_course(&self, slug: &CourseSlug) -> Result<RawCourse, CatalogError> {
        self.courses
            .get(slug)
            .cloned()
            .ok_or_else(|| CatalogError::CourseNotFound(slug.as_str().to_owned()))
    }

    async fn fetch_quiz(&self, id: &QuizId) -> Result<RawQuiz, CatalogError> {
        self.quizzes
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::QuizNotFound(id.as_str().to_owned()))
    }
}

//
// ─── CATALOG SERVICE ───────────────────────────────────────────────────────────
//

/// Thin façade over a provider that hands out normalized domain values.
#[derive(Clone)]
pub struct CatalogService {
    provider: Arc<dyn CourseProvider>,
}

impl CatalogService {
    #[must_use]
    pub fn new(provider: Arc<dyn CourseProvider>) -> Self {
        Self { provider }
    }

    /// Fetches and normalizes a course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for fetch or validation failures.
    pub async fn load_course(&self, slug: &CourseSlug) -> Result<Course, CatalogError> {
        let raw = self.provider.fetch_course(slug).await?;
        normalize_course(raw)
    }

    /// Fetches and normalizes a quiz.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for fetch or validation failures.
    pub async fn load_quiz(&self, id: &QuizId) -> Result<Quiz, CatalogError> {
        let raw = self.provider.fetch_quiz(id).await?;
        normalize_quiz(raw)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::sequence::flatten;

    fn payload(value: serde_json::Value) -> RawCourse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn normalizes_topical_and_direct_module_shapes() {
        let raw = payload(serde_json::json!({
            "id": "course-1",
            "slug": "rust-onboarding",
            "title": "Rust Onboarding",
            "status": "live",
            "curriculum": [
                {
                    "id": "m2",
                    "title": "Direct",
                    "order": 1,
                    "lessons": [
                        {"id": "l3", "title": "Three", "order": 0, "type": "guide"}
                    ]
                },
                {
                    "id": "m1",
                    "title": "Topical",
                    "order": 0,
                    "topics": [
                        {
                            "id": "t1",
                            "title": "T",
                            "order": 0,
                            "lessons": [
                                {"id": "l1", "title": "One", "order": 0, "type": "video"},
                                {"id": "l2", "title": "Two", "order": 1, "type": "quiz"}
                            ]
                        }
                    ]
                }
            ]
        }));

        let course = normalize_course(raw).unwrap();
        let sequence = flatten(&course);

        let ids: Vec<&str> = sequence
            .iter()
            .map(|entry| entry.lesson_id.as_str())
            .collect();
        assert_eq!(ids, ["l1", "l2", "l3"]);
        assert_eq!(sequence.get(1).unwrap().kind, LessonKind::Quiz);
    }

    #[test]
    fn module_with_both_shapes_keeps_topics() {
        let raw = payload(serde_json::json!({
            "id": "course-1",
            "slug": "both",
            "title": "Both Shapes",
            "curriculum": [
                {
                    "id": "m1",
                    "title": "Odd",
                    "order": 0,
                    "topics": [
                        {"id": "t1", "title": "T", "order": 0, "lessons": [
                            {"id": "l1", "title": "One", "order": 0}
                        ]}
                    ],
                    "lessons": [
                        {"id": "dup", "title": "Ignored", "order": 0}
                    ]
                }
            ]
        }));

        let course = normalize_course(raw).unwrap();
        // The direct lesson must not be double counted next to the topics.
        assert_eq!(course.curriculum()[0].children.lesson_count(), 1);
        assert_eq!(flatten(&course).len(), 1);
    }

    #[test]
    fn unknown_lesson_type_defaults_to_video() {
        let raw = payload(serde_json::json!({
            "id": "course-1",
            "slug": "c",
            "title": "C",
            "curriculum": [
                {"id": "m1", "title": "M", "order": 0, "lessons": [
                    {"id": "l1", "title": "One", "order": 0, "type": "hologram"}
                ]}
            ]
        }));

        let course = normalize_course(raw).unwrap();
        let sequence = flatten(&course);
        assert_eq!(sequence.get(0).unwrap().kind, LessonKind::Video);
    }

    #[test]
    fn bad_media_reference_degrades_to_none() {
        let raw = payload(serde_json::json!({
            "id": "course-1",
            "slug": "c",
            "title": "C",
            "curriculum": [
                {"id": "m1", "title": "M", "order": 0, "lessons": [
                    {"id": "l1", "title": "One", "order": 0, "media": "not a url"},
                    {"id": "l2", "title": "Two", "order": 1,
                     "media": "https://cdn.example.com/v/2.mp4"}
                ]}
            ]
        }));

        let course = normalize_course(raw).unwrap();
        let ModuleChildren::Lessons(lessons) = &course.curriculum()[0].children else {
            panic!("expected direct lessons");
        };
        assert!(lessons[0].media.is_none());
        assert!(lessons[1].media.is_some());
    }

    #[test]
    fn final_quiz_id_carries_through() {
        let raw = payload(serde_json::json!({
            "id": "course-1",
            "slug": "c",
            "title": "C",
            "final_quiz_id": "final-1",
            "curriculum": []
        }));

        let course = normalize_course(raw).unwrap();
        assert_eq!(course.final_quiz().unwrap().as_str(), "final-1");
    }

    #[test]
    fn normalize_quiz_keeps_question_order_and_explanations() {
        let raw: RawQuiz = serde_json::from_value(serde_json::json!({
            "id": "qz-1",
            "questions": [
                {"question": "Q1", "options": ["a", "b"], "correct_answer": 0},
                {"question": "Q2", "options": ["a", "b", "c"], "correct_answer": 2,
                 "explanation": "because"}
            ]
        }))
        .unwrap();

        let quiz = normalize_quiz(raw).unwrap();
        assert_eq!(quiz.total_questions(), 2);
        assert_eq!(quiz.question(1).unwrap().explanation.as_deref(), Some("because"));
    }

    #[tokio::test]
    async fn static_provider_serves_fixtures() {
        let provider = StaticCourseProvider::new().with_course(payload(serde_json::json!({
            "id": "course-1",
            "slug": "fixture",
            "title": "Fixture",
            "curriculum": []
        })));
        let catalog = CatalogService::new(Arc::new(provider));

        let course = catalog.load_course(&CourseSlug::new("fixture")).await.unwrap();
        assert_eq!(course.title(), "Fixture");

        let missing = catalog.load_course(&CourseSlug::new("nope")).await;
        assert!(matches!(missing, Err(CatalogError::CourseNotFound(_))));
    }
}
