use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use lms_core::model::{CourseId, ModuleId, Topic, TopicId};
use services::ScanService;
use storage::repository::{
    CourseRepository, InMemoryRepository, ModuleRepository, TopicRepository,
};

const PREFIX: &str = "teach-laoz";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

fn scanner(root: &Path, repo: &InMemoryRepository) -> ScanService {
    ScanService::new(
        root,
        PREFIX,
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

async fn module_topics(repo: &InMemoryRepository, module: &str) -> Vec<Topic> {
    repo.topics_by_module(&ModuleId::new(module)).await.unwrap()
}

#[tokio::test]
async fn scan_links_audio_and_evaluation_siblings() {
    let root = TempDir::new().unwrap();
    let module_dir = root
        .path()
        .join("teach-laoz-redes/modulos/modulo1");
    write(&module_dir.join("tema_1_contenido.md"), "# Tema 1\n");
    write(&module_dir.join("tema_1_audio.mp3"), "");
    write(&module_dir.join("tema_1_evaluacion.md"), "## Pregunta 1\n");

    let repo = InMemoryRepository::new();
    let courses = scanner(root.path(), &repo).scan_courses().await.unwrap();
    assert_eq!(courses.len(), 1);

    let topics = module_topics(&repo, "teach-laoz-redes/modulo1").await;
    assert_eq!(topics.len(), 1, "the evaluation file must not be a topic");

    let topic = &topics[0];
    assert_eq!(
        topic.id,
        TopicId::new("teach-laoz-redes/modulo1/tema_1_contenido")
    );
    assert_eq!(topic.title, "Tema 1");
    assert_eq!(
        topic.audio_path.as_deref(),
        Some("teach-laoz-redes/modulos/modulo1/tema_1_audio.mp3")
    );
    assert_eq!(
        topic.evaluation_path.as_deref(),
        Some("teach-laoz-redes/modulos/modulo1/tema_1_evaluacion.md")
    );
}

#[tokio::test]
async fn bare_stem_audio_is_matched_for_content_files() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-sql/modulos/modulo1");
    write(&module_dir.join("tema_1_contenido.md"), "cuerpo\n");
    write(&module_dir.join("tema_1.wav"), "");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-sql/modulo1").await;
    assert_eq!(
        topics[0].audio_path.as_deref(),
        Some("teach-laoz-sql/modulos/modulo1/tema_1.wav")
    );
}

#[tokio::test]
async fn extension_swap_wins_over_companion_names() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-sql/modulos/modulo1");
    write(&module_dir.join("tema_1_contenido.md"), "cuerpo\n");
    write(&module_dir.join("tema_1_contenido.mp3"), "");
    write(&module_dir.join("tema_1_audio.wav"), "");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-sql/modulo1").await;
    assert_eq!(
        topics[0].audio_path.as_deref(),
        Some("teach-laoz-sql/modulos/modulo1/tema_1_contenido.mp3")
    );
}

#[tokio::test]
async fn topics_without_companions_link_nothing() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-git/modulos/modulo1");
    write(&module_dir.join("introduccion.md"), "hola\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-git/modulo1").await;
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].audio_path, None);
    assert_eq!(topics[0].evaluation_path, None);
}

#[tokio::test]
async fn script_companions_never_appear_as_topics() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-git/modulos/modulo1");
    write(&module_dir.join("tema_1_contenido.md"), "cuerpo\n");
    write(&module_dir.join("tema_1_guion.md"), "guion\n");
    write(&module_dir.join("tema_2_evaluacion.md"), "quiz\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-git/modulo1").await;
    let ids: Vec<&str> = topics.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["teach-laoz-git/modulo1/tema_1_contenido"]);
}

#[tokio::test]
async fn subtopics_inherit_the_parent_evaluation() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-ip/modulos/modulo1");
    write(&module_dir.join("tema_1_subtema_mascaras.md"), "cuerpo\n");
    write(&module_dir.join("tema_1_evaluacion.md"), "quiz\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-ip/modulo1").await;
    assert_eq!(
        topics[0].evaluation_path.as_deref(),
        Some("teach-laoz-ip/modulos/modulo1/tema_1_evaluacion.md")
    );
}

#[tokio::test]
async fn rescanning_an_unchanged_tree_is_idempotent() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-rust/modulos/modulo1");
    write(&module_dir.join("Presentacion.md"), "# Introducción\n");
    write(&module_dir.join("tema_1_contenido.md"), "uno\n");
    write(&module_dir.join("tema_1_evaluacion.md"), "quiz\n");
    write(&module_dir.join("tema_2.md"), "dos\n");
    write(&module_dir.join("Actividades/practica_1.md"), "tarea\n");

    let repo = InMemoryRepository::new();
    let service = scanner(root.path(), &repo);

    service.scan_courses().await.unwrap();
    let course_id = CourseId::new("teach-laoz-rust");
    let first_course = repo.get_course(&course_id).await.unwrap();
    let first_modules = repo.modules_by_course(&course_id).await.unwrap();
    let first_topics = module_topics(&repo, "teach-laoz-rust/modulo1").await;

    service.scan_courses().await.unwrap();
    assert_eq!(repo.get_course(&course_id).await.unwrap(), first_course);
    assert_eq!(
        repo.modules_by_course(&course_id).await.unwrap(),
        first_modules
    );
    assert_eq!(
        module_topics(&repo, "teach-laoz-rust/modulo1").await,
        first_topics
    );
}

#[tokio::test]
async fn auxiliary_subdirectories_become_simple_topics() {
    let root = TempDir::new().unwrap();
    let module_dir = root.path().join("teach-laoz-rust/modulos/modulo1");
    write(&module_dir.join("tema_1.md"), "uno\n");
    write(&module_dir.join("Actividades/practica_1.md"), "tarea\n");
    write(&module_dir.join("Material/apuntes.md"), "notas\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let topics = module_topics(&repo, "teach-laoz-rust/modulo1").await;
    assert_eq!(topics.len(), 3);
    assert_eq!(topics[0].id.as_str(), "teach-laoz-rust/modulo1/tema_1");
    assert_eq!(
        topics[1].id.as_str(),
        "teach-laoz-rust/modulo1/Actividades/practica_1"
    );
    assert_eq!(topics[1].title, "Actividades: Practica 1");
    assert_eq!(topics[1].order_index, 1);
    assert_eq!(
        topics[2].id.as_str(),
        "teach-laoz-rust/modulo1/Material/apuntes"
    );
    assert_eq!(topics[2].audio_path, None);
}

#[tokio::test]
async fn course_without_modules_is_still_cataloged() {
    let root = TempDir::new().unwrap();
    write(
        &root.path().join("teach-laoz-vacio/README.md"),
        "# Curso Vacío\n\nTodavía sin contenido.\n",
    );

    let repo = InMemoryRepository::new();
    let courses = scanner(root.path(), &repo).scan_courses().await.unwrap();

    assert_eq!(courses.len(), 1);
    let course = repo
        .get_course(&CourseId::new("teach-laoz-vacio"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(course.total_modules, 0);
    assert_eq!(course.title, "Curso Vacío");
    assert_eq!(course.description, "Todavía sin contenido.");
    assert!(
        repo.modules_by_course(&course.id).await.unwrap().is_empty()
    );
}

#[tokio::test]
async fn course_manifest_overrides_derived_metadata() {
    let root = TempDir::new().unwrap();
    let course_dir = root.path().join("teach-laoz-k8s");
    write(
        &course_dir.join("course.json"),
        r#"{"title": "Kubernetes a Fondo", "level": "Avanzado", "duration_hours": 12.5}"#,
    );
    write(&course_dir.join("modulos/modulo1/tema_1.md"), "uno\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let course = repo
        .get_course(&CourseId::new("teach-laoz-k8s"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(course.title, "Kubernetes a Fondo");
    assert_eq!(course.level, "Avanzado");
    assert_eq!(course.duration_hours, 12.5);
    assert_eq!(course.total_modules, 1);
}

#[tokio::test]
async fn modules_sort_by_embedded_number() {
    let root = TempDir::new().unwrap();
    let course_dir = root.path().join("teach-laoz-net/modulos");
    write(&course_dir.join("modulo10/tema.md"), "x\n");
    write(&course_dir.join("modulo2/tema.md"), "x\n");
    write(&course_dir.join("modulo2/Presentacion.md"), "# Capa Física\n");

    let repo = InMemoryRepository::new();
    scanner(root.path(), &repo).scan_courses().await.unwrap();

    let modules = repo
        .modules_by_course(&CourseId::new("teach-laoz-net"))
        .await
        .unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].module_number, 2);
    assert_eq!(modules[0].title, "Capa Física");
    assert_eq!(modules[1].module_number, 10);
    assert_eq!(modules[1].title, "Módulo 10");
}

#[tokio::test]
async fn directories_without_the_prefix_are_ignored() {
    let root = TempDir::new().unwrap();
    write(&root.path().join("otros/README.md"), "# Otros\n");
    write(
        &root.path().join("teach-laoz-a/modulos/modulo1/t.md"),
        "x\n",
    );

    let repo = InMemoryRepository::new();
    let courses = scanner(root.path(), &repo).scan_courses().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id.as_str(), "teach-laoz-a");
}

#[tokio::test]
async fn missing_content_root_warns_and_returns_nothing() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("nope");

    let repo = InMemoryRepository::new();
    let courses = scanner(&missing, &repo).scan_courses().await.unwrap();
    assert!(courses.is_empty());
}
