#![forbid(unsafe_code)]

pub mod bookmark_service;
pub mod content_service;
pub mod course_service;
pub mod error;
pub mod evaluation_service;
pub mod progress_service;
pub mod scanner;

pub use lms_core::Clock;

pub use bookmark_service::BookmarkService;
pub use content_service::{ContentService, TopicContent};
pub use course_service::{CourseService, CourseStructure, ModuleWithTopics};
pub use error::{
    BookmarkServiceError, ContentServiceError, CourseServiceError, EvaluationServiceError,
    ProgressServiceError, ScanServiceError,
};
pub use evaluation_service::{EvaluationService, EvaluationSubmission};
pub use progress_service::{CourseProgress, ProgressService};
pub use scanner::ScanService;
