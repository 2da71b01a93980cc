use std::sync::Arc;

use academy_core::Clock;
use academy_core::model::{CourseSlug, LessonId};
use academy_core::time::fixed_now;
use chrono::Duration;
use serde_json::json;
use services::catalog::{RawCourse, RawQuiz, normalize_course};
use services::{QuizLoopService, QuizRun, StaticCourseProvider};
use storage::repository::{
    InMemoryProgressStore, ProgressRepository, SubmissionRepository,
};

fn course_payload() -> RawCourse {
    serde_json::from_value(json!({
        "id": "course-1",
        "slug": "rust-onboarding",
        "title": "Rust Onboarding",
        "status": "live",
        "curriculum": [
            {"id": "m1", "title": "Module 1", "order": 0, "lessons": [
                {"id": "qz-l1", "title": "Checkpoint Quiz", "order": 0, "type": "quiz"}
            ]}
        ]
    }))
    .unwrap()
}

// Quiz attached to lesson "qz-l1"; option 0 is always correct.
fn quiz_payload() -> RawQuiz {
    serde_json::from_value(json!({
        "id": "qz-l1",
        "questions": (0..5).map(|i| json!({
            "question": format!("Q{i}"),
            "options": ["right", "wrong", "also wrong"],
            "correct_answer": 0
        })).collect::<Vec<_>>()
    }))
    .unwrap()
}

fn loop_service(store: &InMemoryProgressStore, at_minutes: i64) -> QuizLoopService {
    let provider = StaticCourseProvider::new()
        .with_course(course_payload())
        .with_quiz(quiz_payload());
    QuizLoopService::new(
        Clock::fixed(fixed_now() + Duration::minutes(at_minutes)),
        Arc::new(provider),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    )
}

/// Answers every question of the run, choosing option 0 for the first
/// `correct` questions and option 1 for the rest.
async fn run_through(svc: &QuizLoopService, run: &mut QuizRun, correct: usize) -> (u32, bool) {
    loop {
        let index = run.session().question_index();
        let option = if index < correct { 0 } else { 1 };
        run.session_mut().select_option(option).unwrap();
        run.session_mut().check_answer().unwrap();
        if let Some(score) = svc.next_question(run).await.unwrap() {
            return (score.score, score.passed);
        }
    }
}

#[tokio::test]
async fn failed_attempt_then_passing_retake_sets_the_flag() {
    let store = InMemoryProgressStore::new();
    let lesson = LessonId::new("qz-l1");
    let course = normalize_course(course_payload()).unwrap();

    // Attempt 1: 3/5 is below the 80% bar.
    let svc = loop_service(&store, 0);
    let mut run = svc.start_lesson_quiz(&course, &lesson).await.unwrap();
    let (score, passed) = run_through(&svc, &mut run, 3).await;
    assert_eq!(score, 3);
    assert!(!passed);
    assert!(!store.is_quiz_passed(&lesson).await.unwrap());

    let submissions = store.list_submissions().await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert!(!submissions[0].passed());

    // Attempt 2 on the same run: 4/5 passes and flips the stored flag.
    let svc = loop_service(&store, 5);
    svc.retake(&mut run).unwrap();
    let (score, passed) = run_through(&svc, &mut run, 4).await;
    assert_eq!(score, 4);
    assert!(passed);
    assert!(store.is_quiz_passed(&lesson).await.unwrap());

    let submissions = store.list_submissions().await.unwrap();
    assert_eq!(submissions.len(), 2);
    // Newest first: the passing attempt leads the log.
    assert!(submissions[0].passed());
    assert_eq!(submissions[0].score(), 4);
    assert_eq!(submissions[1].score(), 3);
}

#[tokio::test]
async fn a_failing_retake_never_revokes_an_earlier_pass() {
    let store = InMemoryProgressStore::new();
    let lesson = LessonId::new("qz-l1");
    let course = normalize_course(course_payload()).unwrap();

    let svc = loop_service(&store, 0);
    let mut run = svc.start_lesson_quiz(&course, &lesson).await.unwrap();
    let (_, passed) = run_through(&svc, &mut run, 5).await;
    assert!(passed);
    assert!(store.is_quiz_passed(&lesson).await.unwrap());

    // Bombing the retake appends to the log but the flag is one-way.
    let svc = loop_service(&store, 5);
    svc.retake(&mut run).unwrap();
    let (score, passed) = run_through(&svc, &mut run, 0).await;
    assert_eq!(score, 0);
    assert!(!passed);
    assert!(store.is_quiz_passed(&lesson).await.unwrap());

    let submissions = store.list_submissions().await.unwrap();
    assert_eq!(submissions.len(), 2);
}

#[tokio::test]
async fn nothing_persists_before_submission() {
    let store = InMemoryProgressStore::new();
    let lesson = LessonId::new("qz-l1");
    let course = normalize_course(course_payload()).unwrap();

    let svc = loop_service(&store, 0);
    let mut run = svc.start_lesson_quiz(&course, &lesson).await.unwrap();

    // Answer two questions, then walk away.
    for _ in 0..2 {
        run.session_mut().select_option(0).unwrap();
        run.session_mut().check_answer().unwrap();
        svc.next_question(&mut run).await.unwrap();
    }
    drop(run);

    assert!(store.list_submissions().await.unwrap().is_empty());
    assert!(!store.is_quiz_passed(&lesson).await.unwrap());
}

#[tokio::test]
async fn course_flag_is_untouched_by_quiz_flow() {
    let store = InMemoryProgressStore::new();
    let course = normalize_course(course_payload()).unwrap();

    let svc = loop_service(&store, 0);
    let mut run = svc
        .start_lesson_quiz(&course, &LessonId::new("qz-l1"))
        .await
        .unwrap();
    run_through(&svc, &mut run, 5).await;

    // Starting a course is the progress service's job, not the quiz loop's.
    assert!(
        !store
            .is_course_started(&CourseSlug::new("rust-onboarding"))
            .await
            .unwrap()
    );
}
