use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lms_core::Clock;
use services::{
    BookmarkService, ContentService, CourseService, EvaluationService, ProgressService,
    ScanService,
};
use storage::repository::Storage;

pub const SERVICE_NAME: &str = "LMS Learning Platform";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the request handlers share: the service registry and the
/// single-scan guard.
pub struct AppState {
    pub courses: CourseService,
    pub content: ContentService,
    pub progress: ProgressService,
    pub evaluations: EvaluationService,
    pub bookmarks: BookmarkService,
    pub scanner: ScanService,
    scan_busy: AtomicBool,
}

impl AppState {
    #[must_use]
    pub fn new(
        storage: &Storage,
        content_dir: &Path,
        course_prefix: &str,
        clock: Clock,
    ) -> Self {
        Self {
            courses: CourseService::new(
                Arc::clone(&storage.courses),
                Arc::clone(&storage.modules),
                Arc::clone(&storage.topics),
            ),
            content: ContentService::new(content_dir, Arc::clone(&storage.topics)),
            progress: ProgressService::new(clock, Arc::clone(&storage.progress)),
            evaluations: EvaluationService::new(clock, Arc::clone(&storage.evaluations)),
            bookmarks: BookmarkService::new(clock, Arc::clone(&storage.bookmarks)),
            scanner: ScanService::new(
                content_dir,
                course_prefix,
                Arc::clone(&storage.courses),
                Arc::clone(&storage.modules),
                Arc::clone(&storage.topics),
            ),
            scan_busy: AtomicBool::new(false),
        }
    }

    /// Claim the scanner for one run. `None` while another scan is running.
    /// The guard releases the claim on drop, including when a client
    /// disconnects mid-scan.
    pub fn try_begin_scan(self: &Arc<Self>) -> Option<ScanGuard> {
        if self.scan_busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(ScanGuard {
            state: Arc::clone(self),
        })
    }
}

pub struct ScanGuard {
    state: Arc<AppState>,
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.state.scan_busy.store(false, Ordering::SeqCst);
    }
}
