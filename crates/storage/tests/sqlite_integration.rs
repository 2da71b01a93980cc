use chrono::Duration;

use academy_core::model::{
    CourseId, CourseSlug, LessonId, ProgressView, QuizId, QuizScore, QuizSubmission,
};
use academy_core::time::fixed_now;
use storage::repository::{ProgressRepository, SubmissionRepository};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_a_learner_journey() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_journey?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let lesson = LessonId::new("lsn-1");
    let quiz_lesson = LessonId::new("qz-1");
    let slug = CourseSlug::new("rust-onboarding");

    // Watch some of the first lesson, finish it, pass its quiz.
    repo.set_watch_progress(&lesson, 35.0).await.unwrap();
    repo.set_watch_progress(&lesson, 100.0).await.unwrap();
    repo.mark_completed(&lesson).await.unwrap();
    repo.mark_completed(&quiz_lesson).await.unwrap();
    repo.mark_quiz_passed(&quiz_lesson).await.unwrap();
    repo.mark_course_started(&slug).await.unwrap();

    assert_eq!(repo.watch_progress(&lesson).await.unwrap(), 100.0);
    assert!(repo.is_completed(&lesson).await.unwrap());
    assert!(repo.is_quiz_passed(&quiz_lesson).await.unwrap());
    assert!(repo.is_course_started(&slug).await.unwrap());

    // The snapshot view matches the individual reads.
    let snapshot = repo
        .snapshot(&[lesson.clone(), quiz_lesson.clone(), LessonId::new("later")])
        .await
        .unwrap();
    assert!(snapshot.is_completed(&lesson));
    assert!(snapshot.is_quiz_passed(&quiz_lesson));
    assert!(!snapshot.is_completed(&LessonId::new("later")));
}

#[tokio::test]
async fn sqlite_submission_log_is_append_only_and_ordered() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_submissions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let course = CourseId::new("course-1");
    let failed = QuizSubmission::new(
        QuizId::new("qz-1"),
        Some(LessonId::new("qz-1")),
        course.clone(),
        QuizScore::from_counts(2, 5),
        fixed_now(),
    );
    let passed = QuizSubmission::new(
        QuizId::new("qz-1"),
        Some(LessonId::new("qz-1")),
        course.clone(),
        QuizScore::from_counts(5, 5),
        fixed_now() + Duration::minutes(20),
    );
    let final_pass = QuizSubmission::new(
        QuizId::new("final-1"),
        None,
        course,
        QuizScore::from_counts(4, 5),
        fixed_now() + Duration::hours(1),
    );

    repo.append_submission(&failed).await.unwrap();
    repo.append_submission(&passed).await.unwrap();
    repo.append_submission(&final_pass).await.unwrap();

    let listed = repo.list_submissions().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id(), final_pass.id());
    assert_eq!(listed[1].id(), passed.id());
    assert_eq!(listed[2].id(), failed.id());

    // Round-trip fidelity, including the null lesson scope of the final
    // assessment.
    assert_eq!(listed[0].lesson_id(), None);
    assert_eq!(listed[0].score(), 4);
    assert_eq!(listed[0].total_questions(), 5);
    assert!(listed[0].passed());
    assert_eq!(listed[0].submitted_at(), final_pass.submitted_at());
    assert_eq!(listed[2].lesson_id().unwrap().as_str(), "qz-1");
    assert!(!listed[2].passed());
}
