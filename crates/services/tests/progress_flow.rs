use std::sync::Arc;

use lms_core::model::{CourseId, ModuleId, TopicId, UserId};
use lms_core::time::fixed_clock;
use services::{BookmarkService, EvaluationService, EvaluationSubmission, ProgressService};
use storage::repository::{InMemoryRepository, ModuleRepository, TopicRepository};

fn seeded_repo() -> InMemoryRepository {
    InMemoryRepository::new()
}

#[tokio::test]
async fn topic_progress_defaults_to_not_started() {
    let repo = seeded_repo();
    let service = ProgressService::new(fixed_clock(), Arc::new(repo));
    let topic = TopicId::new("c/m/t");

    let progress = service
        .topic_progress(UserId::guest(), &topic)
        .await
        .unwrap();
    assert!(!progress.completed);
    assert_eq!(progress.last_position, 0.0);
    assert_eq!(progress.time_spent_seconds, 0);
}

#[tokio::test]
async fn completing_then_scrubbing_keeps_both_facts() {
    let repo = seeded_repo();
    let service = ProgressService::new(fixed_clock(), Arc::new(repo));
    let user = UserId::guest();
    let course = CourseId::new("c");
    let module = ModuleId::child_of(&course, "modulo1");
    let topic = TopicId::child_of(&module, "tema_1");

    service
        .mark_complete(user, &course, &module, &topic)
        .await
        .unwrap();
    service
        .update_position(user, &topic, 37.5, 60)
        .await
        .unwrap();
    service
        .update_position(user, &topic, 90.0, 30)
        .await
        .unwrap();

    let progress = service.topic_progress(user, &topic).await.unwrap();
    assert!(progress.completed);
    assert_eq!(progress.last_position, 90.0);
    assert_eq!(progress.time_spent_seconds, 90);
}

#[tokio::test]
async fn submissions_are_graded_against_the_threshold() {
    let repo = seeded_repo();
    let service = EvaluationService::new(fixed_clock(), Arc::new(repo));
    let topic = TopicId::new("c/m/t");

    let passing = service
        .submit(
            UserId::guest(),
            EvaluationSubmission {
                topic_id: topic.clone(),
                score: 7.0,
                max_score: 10.0,
                answers: serde_json::json!(["a", "b"]),
                time_spent_seconds: 120,
            },
        )
        .await
        .unwrap();
    assert_eq!(passing.percentage, 70.0);
    assert!(passing.passed);
    assert_eq!(passing.attempt_number, 1);

    let failing = service
        .submit(
            UserId::guest(),
            EvaluationSubmission {
                topic_id: topic.clone(),
                score: 6.0,
                max_score: 10.0,
                answers: serde_json::json!([]),
                time_spent_seconds: 80,
            },
        )
        .await
        .unwrap();
    assert!(!failing.passed);
    assert_eq!(failing.attempt_number, 2);

    let results = service.results(UserId::guest(), &topic).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn invalid_submissions_are_rejected_before_storage() {
    let repo = seeded_repo();
    let service = EvaluationService::new(fixed_clock(), Arc::new(repo));

    let err = service
        .submit(
            UserId::guest(),
            EvaluationSubmission {
                topic_id: TopicId::new("c/m/t"),
                score: 5.0,
                max_score: 0.0,
                answers: serde_json::json!([]),
                time_spent_seconds: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        services::EvaluationServiceError::Evaluation(_)
    ));
}

#[tokio::test]
async fn bookmarks_round_trip_with_titles() {
    let repo = seeded_repo();
    let course = CourseId::new("c");
    let module = ModuleId::child_of(&course, "modulo1");
    repo.upsert_module(&lms_core::model::Module {
        id: module.clone(),
        course_id: course,
        module_number: 1,
        title: "Módulo 1".into(),
        description: String::new(),
        order_index: 0,
    })
    .await
    .unwrap();
    let topic = lms_core::model::Topic {
        id: TopicId::child_of(&module, "tema_1"),
        module_id: module,
        title: "Tema 1".into(),
        file_path: "c/modulos/modulo1/tema_1.md".into(),
        audio_path: None,
        evaluation_path: None,
        order_index: 0,
        estimated_minutes: 0,
    };
    repo.upsert_topic(&topic).await.unwrap();

    let service = BookmarkService::new(fixed_clock(), Arc::new(repo));
    let user = UserId::guest();

    service
        .add(user, topic.id.clone(), Some("repasar".into()))
        .await
        .unwrap();
    let items = service.list(user).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].topic_title, "Tema 1");
    assert_eq!(items[0].module_title, "Módulo 1");

    assert!(service.remove(user, &topic.id).await.unwrap());
    assert!(service.list(user).await.unwrap().is_empty());
}
