use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;

/// A top-level content unit, corresponding to one content-root subdirectory.
///
/// Rows are refreshed wholesale on each scan; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub level: String,
    pub duration_hours: f64,
    pub total_modules: u32,
    pub author: String,
    pub version: String,
    pub cover_image: Option<String>,
}

impl Course {
    /// A course with only its identity and title set, as produced before any
    /// metadata file has been consulted.
    #[must_use]
    pub fn untitled(id: CourseId, title: String) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            level: DEFAULT_LEVEL.to_string(),
            duration_hours: 0.0,
            total_modules: 0,
            author: String::new(),
            version: "1.0.0".to_string(),
            cover_image: None,
        }
    }
}

/// Level assumed when course metadata does not specify one.
pub const DEFAULT_LEVEL: &str = "Intermedio";
