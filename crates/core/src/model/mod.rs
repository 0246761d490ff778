mod bookmark;
mod course;
mod evaluation;
mod ids;
mod module;
mod progress;
mod topic;

pub use bookmark::{Bookmark, BookmarkListItem};
pub use course::{Course, DEFAULT_LEVEL};
pub use evaluation::{
    EvaluationError, EvaluationOutcome, EvaluationResult, PASS_THRESHOLD_PERCENT,
};
pub use ids::{CourseId, ModuleId, TopicId, UserId};
pub use module::Module;
pub use progress::{CourseStats, Progress};
pub use topic::Topic;
