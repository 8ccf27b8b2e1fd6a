//! Project model acquisition.
//!
//! The engine never introspects the build tool itself; it asks a
//! `ModelProvider` for a complete `ProjectModel` and refuses to run on
//! anything less. A provider either returns a full model or a typed
//! `ProjectUnreadable` error with the underlying diagnostic attached.
//! A partial model would turn into false negatives downstream.

pub mod command;
pub mod local;

use crate::core::errors::{Error, Result};
use crate::core::ProjectModel;
use std::path::Path;

pub use command::CommandModelProvider;
pub use local::LocalModelProvider;

/// Build descriptors that mark a directory as a recognizable project root.
pub const BUILD_DESCRIPTORS: &[&str] = &[
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
];

pub trait ModelProvider {
    fn read(&self, project_path: &Path) -> Result<ProjectModel>;
}

pub fn has_build_descriptor(path: &Path) -> bool {
    BUILD_DESCRIPTORS
        .iter()
        .any(|name| path.join(name).is_file())
}

/// Validate the input path and delegate to the provider.
pub fn read_project(provider: &dyn ModelProvider, path: &Path) -> Result<ProjectModel> {
    if !path.is_dir() {
        return Err(Error::project_unreadable(path, "not a directory"));
    }
    if !has_build_descriptor(path) {
        return Err(Error::project_unreadable(
            path,
            "no recognizable build descriptor",
        ));
    }
    provider.read(path)
}

/// Fixed-model provider for tests and embedding callers that already hold
/// a model.
pub struct StaticModelProvider {
    model: ProjectModel,
}

impl StaticModelProvider {
    pub fn new(model: ProjectModel) -> Self {
        Self { model }
    }
}

impl ModelProvider for StaticModelProvider {
    fn read(&self, _project_path: &Path) -> Result<ProjectModel> {
        Ok(self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolVersion;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn empty_model(root: &Path) -> ProjectModel {
        ProjectModel {
            root: root.to_path_buf(),
            tool_version: ToolVersion::new(8, 5, 0),
            modules: vec![],
            properties: HashMap::new(),
        }
    }

    #[test]
    fn rejects_paths_without_a_descriptor() {
        let dir = TempDir::new().unwrap();
        let provider = StaticModelProvider::new(empty_model(dir.path()));
        let err = read_project(&provider, dir.path()).unwrap_err();
        assert!(matches!(err, Error::ProjectUnreadable { .. }));
    }

    #[test]
    fn accepts_a_directory_with_a_descriptor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("build.gradle"), "").unwrap();
        let provider = StaticModelProvider::new(empty_model(dir.path()));
        assert!(read_project(&provider, dir.path()).is_ok());
    }
}
