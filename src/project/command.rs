//! Model provider backed by an external integration command.
//!
//! The command is expected to print a JSON model document on stdout when
//! invoked with the project path as its final argument. Anything else (a
//! missing executable, a nonzero exit, unparsable output, a hung process)
//! becomes `ProjectUnreadable` or a typed timeout, never a partial model.

use crate::common::run_with_timeout;
use crate::core::errors::{Error, Result};
use crate::core::{ProjectModel, ProjectModule, ToolVersion};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub struct CommandModelProvider {
    command: String,
    timeout: Duration,
}

impl CommandModelProvider {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn resolve_executable(&self) -> Result<PathBuf> {
        let command = Path::new(&self.command);
        if command.components().count() > 1 {
            return Ok(command.to_path_buf());
        }
        which::which(&self.command).map_err(|err| {
            Error::project_unreadable(
                &self.command,
                format!("integration command not found: {err}"),
            )
        })
    }
}

impl super::ModelProvider for CommandModelProvider {
    fn read(&self, project_path: &Path) -> Result<ProjectModel> {
        let executable = self.resolve_executable()?;
        let root = project_path.to_path_buf();

        let output = run_with_timeout("model provider", self.timeout, move || {
            Command::new(&executable)
                .arg(&root)
                .current_dir(&root)
                .output()
                .map_err(|err| {
                    Error::project_unreadable(&root, format!("cannot invoke provider: {err}"))
                })
        })?;

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr);
            return Err(Error::project_unreadable(
                project_path,
                format!("provider exited with {}: {}", output.status, diagnostic.trim()),
            ));
        }

        let payload: ModelPayload = serde_json::from_slice(&output.stdout).map_err(|err| {
            Error::project_unreadable(project_path, format!("malformed model payload: {err}"))
        })?;
        payload.into_model(project_path)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelPayload {
    tool_version: String,
    modules: Vec<ModulePayload>,
    #[serde(default)]
    properties: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModulePayload {
    name: String,
    path: PathBuf,
    #[serde(default)]
    source_files: Vec<PathBuf>,
    #[serde(default)]
    task_names: Vec<String>,
}

impl ModelPayload {
    fn into_model(self, root: &Path) -> Result<ProjectModel> {
        let tool_version = ToolVersion::parse(&self.tool_version).ok_or_else(|| {
            Error::project_unreadable(
                root,
                format!("provider reported unparsable tool version {:?}", self.tool_version),
            )
        })?;

        let modules = self
            .modules
            .into_iter()
            .map(|m| ProjectModule {
                name: m.name,
                path: absolutize(root, m.path),
                source_files: m
                    .source_files
                    .into_iter()
                    .map(|f| absolutize(root, f))
                    .collect(),
                task_names: m.task_names,
            })
            .collect();

        Ok(ProjectModel {
            root: root.to_path_buf(),
            tool_version,
            modules,
            properties: self.properties,
        })
    }
}

fn absolutize(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
