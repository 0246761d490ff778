use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a course: the name of its content-root subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(String);

impl CourseId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a module: `course/module-dir`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier for a module directory inside a course.
    #[must_use]
    pub fn child_of(course: &CourseId, dir_name: &str) -> Self {
        Self(format!("{}/{dir_name}", course.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a topic: `module/file-stem` (or `module/subdir/file-stem`
/// for auxiliary material).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicId(String);

impl TopicId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier for a content file inside a module.
    #[must_use]
    pub fn child_of(module: &ModuleId, stem: &str) -> Self {
        Self(format!("{}/{stem}", module.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a user, issued by the external authentication service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The fallback user when no identity header is present.
    #[must_use]
    pub fn guest() -> Self {
        Self(1)
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_ids_join_with_slash() {
        let course = CourseId::new("teach-laoz-rust");
        let module = ModuleId::child_of(&course, "modulo1");
        assert_eq!(module.as_str(), "teach-laoz-rust/modulo1");

        let topic = TopicId::child_of(&module, "tema_1_contenido");
        assert_eq!(topic.as_str(), "teach-laoz-rust/modulo1/tema_1_contenido");
    }
}
