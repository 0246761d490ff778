//! Content scanner: walks the content root and refreshes the catalog.
//!
//! Courses, modules and topics are discovered purely from the directory
//! layout and filename conventions (see [`rules`]). All writes are upserts
//! keyed on derived identifiers, so rescanning an unchanged tree leaves the
//! catalog byte-identical.

mod metadata;
mod rules;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use lms_core::model::{Course, CourseId, Module, ModuleId, Topic, TopicId};
use storage::repository::{CourseRepository, ModuleRepository, TopicRepository};

use crate::error::ScanServiceError;

/// Subdirectories holding auxiliary material, cataloged as simple topics.
const AUXILIARY_SUBDIRS: &[&str] = &["Actividades", "Material", "Evaluaciones"];

/// Directory holding a course's modules.
const MODULES_DIR: &str = "modulos";

/// Scans the content root and upserts the resulting catalog rows.
///
/// One scan at a time: callers are expected to serialize invocations (the
/// server guards the manual trigger with a busy flag).
pub struct ScanService {
    content_dir: PathBuf,
    course_prefix: String,
    courses: Arc<dyn CourseRepository>,
    modules: Arc<dyn ModuleRepository>,
    topics: Arc<dyn TopicRepository>,
}

impl ScanService {
    #[must_use]
    pub fn new(
        content_dir: impl Into<PathBuf>,
        course_prefix: impl Into<String>,
        courses: Arc<dyn CourseRepository>,
        modules: Arc<dyn ModuleRepository>,
        topics: Arc<dyn TopicRepository>,
    ) -> Self {
        Self {
            content_dir: content_dir.into(),
            course_prefix: course_prefix.into(),
            courses,
            modules,
            topics,
        }
    }

    /// Discover and catalog every course under the content root.
    ///
    /// Per-course and per-file anomalies are logged and skipped; a missing
    /// content root yields an empty result with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ScanServiceError` only when the catalog store rejects a
    /// write.
    pub async fn scan_courses(&self) -> Result<Vec<Course>, ScanServiceError> {
        info!("scanning for courses in {}", self.content_dir.display());

        if !self.content_dir.is_dir() {
            warn!(
                "content directory not found: {}",
                self.content_dir.display()
            );
            return Ok(Vec::new());
        }

        let mut courses = Vec::new();
        for name in sorted_entries(&self.content_dir, EntryKind::Directory) {
            if !name.starts_with(&self.course_prefix) {
                continue;
            }
            let course_path = self.content_dir.join(&name);
            if let Some(course) = self.scan_course(&name, &course_path).await? {
                courses.push(course);
            }
        }

        info!("found {} courses", courses.len());
        Ok(courses)
    }

    async fn scan_course(
        &self,
        dir_name: &str,
        course_path: &Path,
    ) -> Result<Option<Course>, ScanServiceError> {
        let course_id = CourseId::new(dir_name);
        let mut course =
            match metadata::course_metadata(&course_id, course_path, &self.course_prefix) {
                Ok(course) => course,
                Err(err) => {
                    warn!("skipping course {dir_name}: {err}");
                    return Ok(None);
                }
            };

        let modules_dir = course_path.join(MODULES_DIR);
        let module_dirs = if modules_dir.is_dir() {
            sorted_module_dirs(&modules_dir)
        } else {
            warn!("no modules directory for {dir_name}");
            Vec::new()
        };

        course.total_modules = u32::try_from(module_dirs.len()).unwrap_or(u32::MAX);
        self.courses.upsert_course(&course).await?;
        debug!("cataloged course {}: {}", course.id, course.title);

        for (index, module_dir) in module_dirs.iter().enumerate() {
            let order = u32::try_from(index).unwrap_or(u32::MAX);
            let module_path = modules_dir.join(module_dir);
            let module = Module {
                id: ModuleId::child_of(&course.id, module_dir),
                course_id: course.id.clone(),
                module_number: metadata::module_number(module_dir).unwrap_or(order),
                title: metadata::module_title(&module_path, module_dir),
                description: String::new(),
                order_index: order,
            };
            self.modules.upsert_module(&module).await?;
            self.scan_topics(&module.id, &module_path).await?;
        }

        Ok(Some(course))
    }

    async fn scan_topics(
        &self,
        module_id: &ModuleId,
        module_path: &Path,
    ) -> Result<(), ScanServiceError> {
        let mut order: u32 = 0;
        for file_name in sorted_entries(module_path, EntryKind::File) {
            if !rules::is_content_topic(&file_name) {
                continue;
            }
            match self.build_topic(module_id, module_path, &file_name, order) {
                Some(topic) => {
                    self.topics.upsert_topic(&topic).await?;
                    order += 1;
                }
                None => {
                    warn!(
                        "skipping {file_name} in {}: not under the content root",
                        module_path.display()
                    );
                }
            }
        }

        for subdir in AUXILIARY_SUBDIRS {
            let subdir_path = module_path.join(subdir);
            if subdir_path.is_dir() {
                order = self
                    .scan_auxiliary(module_id, subdir, &subdir_path, order)
                    .await?;
            }
        }

        Ok(())
    }

    fn build_topic(
        &self,
        module_id: &ModuleId,
        module_path: &Path,
        file_name: &str,
        order: u32,
    ) -> Option<Topic> {
        let stem = file_name.strip_suffix(rules::MARKDOWN_EXT).unwrap_or(file_name);
        let file_path = self.relative_path(&module_path.join(file_name))?;

        let audio_path = rules::find_audio(file_name, module_path)
            .and_then(|candidate| self.relative_path(&module_path.join(candidate)));
        let evaluation_path = rules::find_evaluation(file_name, module_path)
            .and_then(|candidate| self.relative_path(&module_path.join(candidate)));

        Some(Topic {
            id: TopicId::child_of(module_id, stem),
            module_id: module_id.clone(),
            title: rules::topic_title(file_name),
            file_path,
            audio_path,
            evaluation_path,
            order_index: order,
            // TODO: estimate from word count once bodies are read during scans.
            estimated_minutes: 0,
        })
    }

    async fn scan_auxiliary(
        &self,
        module_id: &ModuleId,
        subdir: &str,
        subdir_path: &Path,
        start_index: u32,
    ) -> Result<u32, ScanServiceError> {
        let mut order = start_index;
        for file_name in sorted_entries(subdir_path, EntryKind::File) {
            if !rules::is_markdown(&file_name) {
                continue;
            }
            let stem = file_name.strip_suffix(rules::MARKDOWN_EXT).unwrap_or(&file_name);
            let Some(file_path) = self.relative_path(&subdir_path.join(&file_name)) else {
                continue;
            };
            let topic = Topic {
                id: TopicId::new(format!("{module_id}/{subdir}/{stem}")),
                module_id: module_id.clone(),
                title: format!("{subdir}: {}", rules::topic_title(&file_name)),
                file_path,
                audio_path: None,
                evaluation_path: None,
                order_index: order,
                estimated_minutes: 0,
            };
            self.topics.upsert_topic(&topic).await?;
            order += 1;
        }
        Ok(order)
    }

    /// Content-root-relative path with forward slashes, as stored in rows.
    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.content_dir).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

/// Names of the entries of `dir` matching `kind`, lexically sorted so scan
/// output does not depend on readdir order. Unreadable directories and
/// non-UTF-8 names are logged and skipped.
fn sorted_entries(dir: &Path, kind: EntryKind) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };
        let matches = match kind {
            EntryKind::File => entry.path().is_file(),
            EntryKind::Directory => entry.path().is_dir(),
        };
        if !matches {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("skipping non-utf8 entry {name:?} in {}", dir.display()),
        }
    }
    names.sort();
    names
}

/// Module directories sorted by their embedded number, falling back to the
/// lexical position for unnumbered names.
fn sorted_module_dirs(modules_dir: &Path) -> Vec<String> {
    let mut dirs: Vec<String> = sorted_entries(modules_dir, EntryKind::Directory)
        .into_iter()
        .filter(|name| name.starts_with("modulo"))
        .collect();
    dirs.sort_by_key(|name| metadata::module_number(name).unwrap_or(0));
    dirs
}
