use lms_core::model::{
    Course, CourseId, Module, ModuleId, Topic, TopicId, UserId,
};
use lms_core::time::fixed_now;
use storage::repository::{
    BookmarkRepository, CourseRepository, EvaluationRepository, ModuleRepository,
    NewEvaluationResult, ProgressRepository, TopicRepository,
};
use storage::sqlite::SqliteRepository;

fn build_course(id: &str) -> Course {
    Course::untitled(CourseId::new(id), format!("Course {id}"))
}

fn build_module(course: &CourseId, dir: &str, order: u32) -> Module {
    Module {
        id: ModuleId::child_of(course, dir),
        course_id: course.clone(),
        module_number: order + 1,
        title: format!("Módulo {}", order + 1),
        description: String::new(),
        order_index: order,
    }
}

fn build_topic(module: &ModuleId, stem: &str, order: u32) -> Topic {
    Topic {
        id: TopicId::child_of(module, stem),
        module_id: module.clone(),
        title: stem.replace('_', " "),
        file_path: format!("{}/{stem}.md", module.as_str()),
        audio_path: None,
        evaluation_path: None,
        order_index: order,
        estimated_minutes: 0,
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn catalog_roundtrip_preserves_rows() {
    let repo = connect("memdb_catalog").await;

    let course = build_course("teach-laoz-rust");
    repo.upsert_course(&course).await.unwrap();
    let module = build_module(&course.id, "modulo1", 0);
    repo.upsert_module(&module).await.unwrap();
    let mut topic = build_topic(&module.id, "tema_1_contenido", 0);
    topic.audio_path = Some("teach-laoz-rust/modulos/modulo1/tema_1_audio.mp3".into());
    topic.evaluation_path = Some("teach-laoz-rust/modulos/modulo1/tema_1_evaluacion.md".into());
    repo.upsert_topic(&topic).await.unwrap();

    let fetched = repo.get_course(&course.id).await.unwrap().unwrap();
    assert_eq!(fetched, course);

    let modules = repo.modules_by_course(&course.id).await.unwrap();
    assert_eq!(modules, vec![module.clone()]);

    let topics = repo.topics_by_module(&module.id).await.unwrap();
    assert_eq!(topics, vec![topic.clone()]);

    let by_id = repo.get_topic(&topic.id).await.unwrap().unwrap();
    assert_eq!(by_id.audio_path, topic.audio_path);
}

#[tokio::test]
async fn upserts_are_idempotent() {
    let repo = connect("memdb_idempotent").await;

    let course = build_course("teach-laoz-sql");
    repo.upsert_course(&course).await.unwrap();
    let module = build_module(&course.id, "modulo1", 0);
    repo.upsert_module(&module).await.unwrap();
    let topic = build_topic(&module.id, "tema_1", 0);

    repo.upsert_topic(&topic).await.unwrap();
    let first = repo.topics_by_module(&module.id).await.unwrap();
    repo.upsert_topic(&topic).await.unwrap();
    let second = repo.topics_by_module(&module.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn position_update_keeps_completion_and_accumulates_time() {
    let repo = connect("memdb_progress").await;
    let user = UserId::guest();
    let course = CourseId::new("c");
    let module = ModuleId::child_of(&course, "modulo1");
    let topic = TopicId::child_of(&module, "tema_1");
    let now = fixed_now();

    repo.mark_completed(user, &course, &module, &topic, now)
        .await
        .unwrap();
    repo.update_position(user, &topic, 120.5, 30, now)
        .await
        .unwrap();
    repo.update_position(user, &topic, 200.0, 45, now)
        .await
        .unwrap();

    let progress = repo.topic_progress(user, &topic).await.unwrap().unwrap();
    assert!(progress.completed);
    assert_eq!(progress.completed_at, Some(now));
    assert_eq!(progress.last_position, 200.0);
    assert_eq!(progress.time_spent_seconds, 75);
    assert_eq!(progress.course_id, Some(course.clone()));

    let rows = repo.course_progress(user, &course).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn course_stats_aggregate_over_modules() {
    let repo = connect("memdb_stats").await;
    let user = UserId::guest();

    let course = build_course("teach-laoz-go");
    repo.upsert_course(&course).await.unwrap();
    let first_module = build_module(&course.id, "modulo1", 0);
    let second_module = build_module(&course.id, "modulo2", 1);
    repo.upsert_module(&first_module).await.unwrap();
    repo.upsert_module(&second_module).await.unwrap();

    let done = build_topic(&first_module.id, "tema_1", 0);
    let pending = build_topic(&first_module.id, "tema_2", 1);
    let other = build_topic(&second_module.id, "tema_1", 0);
    for topic in [&done, &pending, &other] {
        repo.upsert_topic(topic).await.unwrap();
    }

    repo.mark_completed(user, &course.id, &first_module.id, &done.id, fixed_now())
        .await
        .unwrap();
    repo.update_position(user, &done.id, 10.0, 90, fixed_now())
        .await
        .unwrap();

    let stats = repo.course_stats(user, &course.id).await.unwrap();
    assert_eq!(stats.total_topics, 3);
    assert_eq!(stats.completed_topics, 1);
    assert_eq!(stats.total_modules, 2);
    assert_eq!(stats.completed_modules, 1);
    assert_eq!(stats.total_time_seconds, 90);

    // A user with no progress sees zero completion but the full catalog.
    let fresh = repo
        .course_stats(UserId::new(99), &course.id)
        .await
        .unwrap();
    assert_eq!(fresh.total_topics, 3);
    assert_eq!(fresh.completed_topics, 0);
    assert_eq!(fresh.total_time_seconds, 0);
}

#[tokio::test]
async fn evaluation_attempts_number_monotonically() {
    let repo = connect("memdb_evaluations").await;
    let topic = TopicId::new("c/modulo1/tema_1");
    let submission = NewEvaluationResult {
        user_id: UserId::guest(),
        topic_id: topic.clone(),
        score: 7.0,
        max_score: 10.0,
        percentage: 70.0,
        passed: true,
        answers: serde_json::json!(["a", "b", "c"]),
        time_spent_seconds: 90,
        submitted_at: fixed_now(),
    };

    let first = repo.record_result(submission.clone()).await.unwrap();
    let second = repo.record_result(submission.clone()).await.unwrap();
    assert_eq!(first.attempt_number, 1);
    assert_eq!(second.attempt_number, 2);

    // Another user starts back at attempt 1.
    let mut other_user = submission;
    other_user.user_id = UserId::new(2);
    let other = repo.record_result(other_user).await.unwrap();
    assert_eq!(other.attempt_number, 1);

    let results = repo
        .results_for_topic(UserId::guest(), &topic)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].attempt_number, 2);
    assert_eq!(results[0].answers, serde_json::json!(["a", "b", "c"]));
    assert!(results[0].passed);
}

#[tokio::test]
async fn bookmarks_upsert_and_join_titles() {
    let repo = connect("memdb_bookmarks").await;
    let user = UserId::guest();

    let course = build_course("teach-laoz-py");
    repo.upsert_course(&course).await.unwrap();
    let module = build_module(&course.id, "modulo1", 0);
    repo.upsert_module(&module).await.unwrap();
    let topic = build_topic(&module.id, "tema_1", 0);
    repo.upsert_topic(&topic).await.unwrap();

    let bookmark = lms_core::model::Bookmark {
        user_id: user,
        topic_id: topic.id.clone(),
        note: None,
        created_at: fixed_now(),
    };
    repo.add_bookmark(&bookmark).await.unwrap();
    repo.add_bookmark(&lms_core::model::Bookmark {
        note: Some("repasar".into()),
        ..bookmark.clone()
    })
    .await
    .unwrap();

    let items = repo.list_bookmarks(user).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].note.as_deref(), Some("repasar"));
    assert_eq!(items[0].module_title, module.title);

    assert!(repo.remove_bookmark(user, &topic.id).await.unwrap());
    assert!(!repo.remove_bookmark(user, &topic.id).await.unwrap());
}
