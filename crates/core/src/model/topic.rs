use serde::{Deserialize, Serialize};

use crate::model::ids::{ModuleId, TopicId};

/// A single content unit: one markdown file within a module, optionally
/// paired with a sibling audio file and/or an evaluation file.
///
/// All paths are relative to the content root. Rescans overwrite fields by
/// identifier, so an unchanged tree yields identical rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub module_id: ModuleId,
    pub title: String,
    pub file_path: String,
    pub audio_path: Option<String>,
    pub evaluation_path: Option<String>,
    pub order_index: u32,
    pub estimated_minutes: u32,
}
