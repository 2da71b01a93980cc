//! Flattening of a course's nested curriculum into one ordered lesson run.
//!
//! The flattened sequence is the single source of truth for "previous
//! lesson" relationships; lock evaluation never looks at the nested module
//! and topic structure again once the sequence exists.

use crate::model::{Course, CurriculumItem, Lesson, LessonId, LessonKind, ModuleChildren, Topic};

/// Title of the synthetic module appended for a course-level quiz.
pub const FINAL_ASSESSMENT_TITLE: &str = "Final Assessment";

//
// ─── SEQUENCE ──────────────────────────────────────────────────────────────────
//

/// One entry of the flattened curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedLesson {
    pub lesson_id: LessonId,
    /// 0-based, contiguous across the whole course.
    pub position: usize,
    pub kind: LessonKind,
}

impl SequencedLesson {
    /// True when this entry was synthesized for the course-level quiz rather
    /// than taken from the authored curriculum.
    #[must_use]
    pub fn is_final_assessment(&self) -> bool {
        self.kind == LessonKind::FinalAssessment
    }
}

/// Strictly ordered run of all lessons in a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonSequence {
    entries: Vec<SequencedLesson>,
}

impl LessonSequence {
    #[must_use]
    pub fn entries(&self) -> &[SequencedLesson] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&SequencedLesson> {
        self.entries.get(position)
    }

    #[must_use]
    pub fn position_of(&self, lesson: &LessonId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| &entry.lesson_id == lesson)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequencedLesson> {
        self.entries.iter()
    }

    #[must_use]
    pub fn lesson_ids(&self) -> Vec<LessonId> {
        self.entries
            .iter()
            .map(|entry| entry.lesson_id.clone())
            .collect()
    }
}

//
// ─── FLATTEN ───────────────────────────────────────────────────────────────────
//

/// Flattens a course into its ordered lesson sequence.
///
/// Modules sort by order index; a topical module sorts its topics and each
/// topic's lessons, a direct module sorts its lessons, and an empty module
/// contributes nothing (position indices stay contiguous). A course-level
/// quiz appends one synthetic final-assessment entry whose lesson id equals
/// the quiz id.
#[must_use]
pub fn flatten(course: &Course) -> LessonSequence {
    let mut entries = Vec::new();

    let mut modules: Vec<&CurriculumItem> = course.curriculum().iter().collect();
    modules.sort_by_key(|module| module.order);

    for module in modules {
        match &module.children {
            ModuleChildren::Topics(topics) => {
                let mut topics: Vec<&Topic> = topics.iter().collect();
                topics.sort_by_key(|topic| topic.order);
                for topic in topics {
                    append_sorted(&mut entries, &topic.lessons);
                }
            }
            ModuleChildren::Lessons(lessons) => append_sorted(&mut entries, lessons),
            ModuleChildren::Empty => {}
        }
    }

    if let Some(quiz_id) = course.final_quiz() {
        let position = entries.len();
        entries.push(SequencedLesson {
            lesson_id: LessonId::from(quiz_id),
            position,
            kind: LessonKind::FinalAssessment,
        });
    }

    LessonSequence { entries }
}

fn append_sorted(entries: &mut Vec<SequencedLesson>, lessons: &[Lesson]) {
    let mut lessons: Vec<&Lesson> = lessons.iter().collect();
    lessons.sort_by_key(|lesson| lesson.order);
    for lesson in lessons {
        let position = entries.len();
        entries.push(SequencedLesson {
            lesson_id: lesson.id.clone(),
            position,
            kind: lesson.kind,
        });
    }
}

/// The synthetic trailing module a course-level quiz is rendered under.
///
/// Returns `None` when the course has no final quiz. The module holds a
/// single final-assessment lesson whose id equals the quiz id, ordered after
/// every authored module.
#[must_use]
pub fn final_assessment_module(course: &Course) -> Option<CurriculumItem> {
    use crate::model::ModuleId;

    let quiz_id = course.final_quiz()?;
    let order = course
        .curriculum()
        .iter()
        .map(|module| module.order)
        .max()
        .map_or(0, |max| max.saturating_add(1));

    Some(CurriculumItem {
        id: ModuleId::new(quiz_id.as_str()),
        title: FINAL_ASSESSMENT_TITLE.to_owned(),
        order,
        children: ModuleChildren::Lessons(vec![Lesson::new(
            LessonId::from(quiz_id),
            FINAL_ASSESSMENT_TITLE,
            0,
            LessonKind::FinalAssessment,
        )]),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Course, CourseId, CourseSlug, CourseStatus, ModuleId, QuizId, Topic, TopicId,
    };

    fn lesson(id: &str, order: u32) -> Lesson {
        Lesson::new(LessonId::new(id), id.to_uppercase(), order, LessonKind::Video)
    }

    fn course(curriculum: Vec<CurriculumItem>, final_quiz: Option<QuizId>) -> Course {
        Course::new(
            CourseId::new("c1"),
            CourseSlug::new("course-one"),
            "Course One",
            CourseStatus::Live,
            curriculum,
            final_quiz,
        )
        .unwrap()
    }

    #[test]
    fn flattens_mixed_module_shapes_in_order() {
        // Modules arrive unsorted; the direct-lesson module belongs first.
        let curriculum = vec![
            CurriculumItem {
                id: ModuleId::new("m2"),
                title: "Deep Dive".into(),
                order: 1,
                children: ModuleChildren::Topics(vec![
                    Topic {
                        id: TopicId::new("t2"),
                        title: "Later Topic".into(),
                        order: 1,
                        lessons: vec![lesson("l5", 0)],
                    },
                    Topic {
                        id: TopicId::new("t1"),
                        title: "Earlier Topic".into(),
                        order: 0,
                        lessons: vec![lesson("l4", 1), lesson("l3", 0)],
                    },
                ]),
            },
            CurriculumItem {
                id: ModuleId::new("m1"),
                title: "Intro".into(),
                order: 0,
                children: ModuleChildren::Lessons(vec![lesson("l2", 1), lesson("l1", 0)]),
            },
        ];

        let sequence = flatten(&course(curriculum, None));

        let ids: Vec<&str> = sequence
            .iter()
            .map(|entry| entry.lesson_id.as_str())
            .collect();
        assert_eq!(ids, ["l1", "l2", "l3", "l4", "l5"]);
    }

    #[test]
    fn positions_are_contiguous_from_zero() {
        let curriculum = vec![
            CurriculumItem {
                id: ModuleId::new("m1"),
                title: "A".into(),
                order: 0,
                children: ModuleChildren::Lessons(vec![lesson("l1", 0), lesson("l2", 1)]),
            },
            // An empty module must not leave a hole in the positions.
            CurriculumItem {
                id: ModuleId::new("m2"),
                title: "Placeholder".into(),
                order: 1,
                children: ModuleChildren::Empty,
            },
            CurriculumItem {
                id: ModuleId::new("m3"),
                title: "B".into(),
                order: 2,
                children: ModuleChildren::Lessons(vec![lesson("l3", 0)]),
            },
        ];

        let sequence = flatten(&course(curriculum, None));

        assert_eq!(sequence.len(), 3);
        for (expected, entry) in sequence.iter().enumerate() {
            assert_eq!(entry.position, expected);
        }
    }

    #[test]
    fn course_level_quiz_appends_synthetic_trailing_entry() {
        let curriculum = vec![CurriculumItem {
            id: ModuleId::new("m1"),
            title: "A".into(),
            order: 0,
            children: ModuleChildren::Lessons(vec![lesson("l1", 0)]),
        }];

        let sequence = flatten(&course(curriculum, Some(QuizId::new("final-1"))));

        assert_eq!(sequence.len(), 2);
        let last = sequence.get(1).unwrap();
        assert!(last.is_final_assessment());
        assert_eq!(last.lesson_id.as_str(), "final-1");
        assert_eq!(last.position, 1);
    }

    #[test]
    fn empty_course_flattens_to_empty_sequence() {
        let sequence = flatten(&course(Vec::new(), None));
        assert!(sequence.is_empty());
        assert_eq!(sequence.position_of(&LessonId::new("anything")), None);
    }

    #[test]
    fn sequence_length_matches_reachable_lesson_count() {
        let curriculum = vec![
            CurriculumItem {
                id: ModuleId::new("m1"),
                title: "Topical".into(),
                order: 0,
                children: ModuleChildren::Topics(vec![Topic {
                    id: TopicId::new("t1"),
                    title: "T".into(),
                    order: 0,
                    lessons: vec![lesson("l1", 0), lesson("l2", 1)],
                }]),
            },
            CurriculumItem {
                id: ModuleId::new("m2"),
                title: "Direct".into(),
                order: 1,
                children: ModuleChildren::Lessons(vec![lesson("l3", 0)]),
            },
        ];
        let course = course(curriculum, Some(QuizId::new("fq")));

        let reachable: usize = course
            .curriculum()
            .iter()
            .map(|module| module.children.lesson_count())
            .sum();

        // Reachable lessons plus the synthetic final assessment, counted once.
        assert_eq!(flatten(&course).len(), reachable + 1);
    }

    #[test]
    fn final_assessment_module_orders_after_authored_modules() {
        let curriculum = vec![CurriculumItem {
            id: ModuleId::new("m1"),
            title: "A".into(),
            order: 4,
            children: ModuleChildren::Lessons(vec![lesson("l1", 0)]),
        }];
        let course = course(curriculum, Some(QuizId::new("final-1")));

        let module = final_assessment_module(&course).unwrap();
        assert_eq!(module.title, FINAL_ASSESSMENT_TITLE);
        assert_eq!(module.order, 5);
        assert_eq!(module.children.lesson_count(), 1);

        let no_quiz = Course::new(
            CourseId::new("c2"),
            CourseSlug::new("c2"),
            "C2",
            CourseStatus::Live,
            Vec::new(),
            None,
        )
        .unwrap();
        assert!(final_assessment_module(&no_quiz).is_none());
    }
}
