//! Course and module metadata extraction.
//!
//! A course directory may carry a `course.json` manifest or a `README.md`;
//! a module directory may carry a `Presentacion.md`. Everything else falls
//! back to names derived from the directory itself.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use lms_core::model::{Course, CourseId};

use super::rules::capitalize_first;

#[derive(Debug, Error)]
pub(crate) enum MetadataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid course.json: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Optional fields of a `course.json` manifest. Anything present overrides
/// the derived defaults; `total_modules` is always recomputed from disk.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseManifest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    duration_hours: Option<f64>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
}

/// Builds a course record from the metadata files in `course_path`.
pub(crate) fn course_metadata(
    id: &CourseId,
    course_path: &Path,
    course_prefix: &str,
) -> Result<Course, MetadataError> {
    let mut course = Course::untitled(id.clone(), format_course_title(id.as_str(), course_prefix));

    let manifest_path = course_path.join("course.json");
    let readme_path = course_path.join("README.md");

    if manifest_path.is_file() {
        let raw = std::fs::read_to_string(&manifest_path)?;
        let manifest: CourseManifest = serde_json::from_str(&raw)?;
        apply_manifest(&mut course, manifest);
    } else if readme_path.is_file() {
        let readme = std::fs::read_to_string(&readme_path)?;
        if let Some(title) = first_heading(&readme) {
            course.title = title;
        }
        if let Some(description) = leading_paragraph(&readme) {
            course.description = description;
        }
    }

    Ok(course)
}

fn apply_manifest(course: &mut Course, manifest: CourseManifest) {
    if let Some(title) = manifest.title {
        course.title = title;
    }
    if let Some(description) = manifest.description {
        course.description = description;
    }
    if let Some(level) = manifest.level {
        course.level = level;
    }
    if let Some(duration_hours) = manifest.duration_hours {
        course.duration_hours = duration_hours;
    }
    if let Some(author) = manifest.author {
        course.author = author;
    }
    if let Some(version) = manifest.version {
        course.version = version;
    }
    if let Some(cover_image) = manifest.cover_image {
        course.cover_image = Some(cover_image);
    }
}

/// Readable title from a course directory name: discovery prefix removed,
/// separators spaced out, each word capitalized.
pub(crate) fn format_course_title(course_id: &str, course_prefix: &str) -> String {
    let prefixed = format!("{course_prefix}-");
    let trimmed = course_id.strip_prefix(&prefixed).unwrap_or(course_id);
    trimmed
        .split('_')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

static MODULE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)modulo[ _-]?(\d+)").expect("valid pattern"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid pattern"));

/// Number embedded in a module directory name, e.g. `modulo_3` → 3.
pub(crate) fn module_number(dir_name: &str) -> Option<u32> {
    MODULE_NUMBER_RE
        .captures(dir_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Module title from `Presentacion.md`, falling back to the directory name.
pub(crate) fn module_title(module_path: &Path, dir_name: &str) -> String {
    let presentation = module_path.join("Presentacion.md");
    if let Ok(content) = std::fs::read_to_string(&presentation) {
        if let Some(title) = first_heading(&content) {
            return title;
        }
    }
    match module_number(dir_name) {
        Some(number) => format!("Módulo {number}"),
        None => capitalize_first(dir_name),
    }
}

/// First markdown heading in the text.
pub(crate) fn first_heading(text: &str) -> Option<String> {
    HEADING_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// First paragraph after the opening heading, used as a course description.
pub(crate) fn leading_paragraph(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| line.trim_start().starts_with('#'))?;

    let mut paragraph: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        if line.trim_start().starts_with('#') {
            break;
        }
        paragraph.push(line.trim());
    }

    if paragraph.is_empty() {
        None
    } else {
        Some(paragraph.join(" "))
    }
}
