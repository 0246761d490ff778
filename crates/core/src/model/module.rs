use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, ModuleId};

/// An ordered subdivision of a course, one directory each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    /// Number embedded in the directory name (`modulo3` → 3), falling back
    /// to the enumeration index when none can be parsed.
    pub module_number: u32,
    pub title: String,
    pub description: String,
    pub order_index: u32,
}
