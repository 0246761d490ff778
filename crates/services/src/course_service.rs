use std::sync::Arc;

use serde::Serialize;

use lms_core::model::{Course, CourseId, Module, Topic};
use storage::repository::{CourseRepository, ModuleRepository, TopicRepository};

use crate::error::CourseServiceError;

/// A module with its topics attached, as served to the client tree view.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithTopics {
    #[serde(flatten)]
    pub module: Module,
    pub topics: Vec<Topic>,
}

/// A course with its full module/topic tree.
#[derive(Debug, Clone, Serialize)]
pub struct CourseStructure {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithTopics>,
}

/// Read side of the catalog: course listings and the navigable tree.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    modules: Arc<dyn ModuleRepository>,
    topics: Arc<dyn TopicRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        modules: Arc<dyn ModuleRepository>,
        topics: Arc<dyn TopicRepository>,
    ) -> Self {
        Self {
            courses,
            modules,
            topics,
        }
    }

    /// All courses, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CourseServiceError> {
        Ok(self.courses.list_courses().await?)
    }

    /// A course with its modules and their topics, in presentation order.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn course_structure(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseStructure>, CourseServiceError> {
        let Some(course) = self.courses.get_course(course_id).await? else {
            return Ok(None);
        };

        let modules = self.modules.modules_by_course(course_id).await?;
        let mut tree = Vec::with_capacity(modules.len());
        for module in modules {
            let topics = self.topics.topics_by_module(&module.id).await?;
            tree.push(ModuleWithTopics { module, topics });
        }

        Ok(Some(CourseStructure {
            course,
            modules: tree,
        }))
    }
}
