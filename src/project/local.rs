//! Built-in model provider that reads the project's own descriptor files.
//!
//! Used when no external integration command is configured. The provider
//! derives the tool version from the wrapper metadata, the module set from
//! the settings script's `include` statements, declared tasks from each
//! module's build script, and build properties from `gradle.properties`.
//! A project whose wrapper version cannot be determined is unreadable:
//! version-gated signatures would otherwise misfire on a guessed model.

use crate::core::errors::{Error, Result};
use crate::core::{ProjectModel, ProjectModule, ToolVersion};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static DISTRIBUTION_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"distributionUrl=.*gradle-(\d+\.\d+(?:\.\d+)?)-").unwrap());
static INCLUDE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]:?([\w:-]+)['"]"#).unwrap());
static TASK_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\btask\s+(\w+)|tasks\.register\(\s*['"](\w+)['"])"#).unwrap()
});

const SOURCE_EXTENSIONS: &[&str] = &["java", "kt", "kts", "groovy", "gradle", "scala"];
const SKIPPED_DIRS: &[&str] = &["build", ".git", ".gradle", "out"];

#[derive(Default)]
pub struct LocalModelProvider;

impl LocalModelProvider {
    pub fn new() -> Self {
        Self
    }
}

impl super::ModelProvider for LocalModelProvider {
    fn read(&self, project_path: &Path) -> Result<ProjectModel> {
        let tool_version = read_wrapper_version(project_path)?;
        let module_paths = read_module_paths(project_path);
        let modules = build_modules(project_path, &module_paths);
        let properties = read_properties(&project_path.join("gradle.properties"));

        Ok(ProjectModel {
            root: project_path.to_path_buf(),
            tool_version,
            modules,
            properties,
        })
    }
}

fn read_wrapper_version(root: &Path) -> Result<ToolVersion> {
    let wrapper = root.join("gradle/wrapper/gradle-wrapper.properties");
    let content = fs::read_to_string(&wrapper).map_err(|err| {
        Error::project_unreadable(root, format!("cannot read wrapper metadata: {err}"))
    })?;

    DISTRIBUTION_VERSION
        .captures(&content)
        .and_then(|c| ToolVersion::parse(&c[1]))
        .ok_or_else(|| {
            Error::project_unreadable(root, "wrapper metadata carries no distribution version")
        })
}

/// Module directories: the root itself plus every `include` token from the
/// settings script, with `:a:b` mapping to `a/b`.
fn read_module_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![root.to_path_buf()];

    for name in ["settings.gradle", "settings.gradle.kts"] {
        let Ok(content) = fs::read_to_string(root.join(name)) else {
            continue;
        };
        for line in content.lines() {
            let trimmed = line.trim_start();
            if !trimmed.starts_with("include") {
                continue;
            }
            for capture in INCLUDE_TOKEN.captures_iter(trimmed) {
                let relative = capture[1].replace(':', "/");
                let path = root.join(relative);
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
    }

    paths
}

fn build_modules(root: &Path, module_paths: &[PathBuf]) -> Vec<ProjectModule> {
    module_paths
        .iter()
        .map(|path| {
            let name = if path == root {
                "root".to_string()
            } else {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unnamed".to_string())
            };
            ProjectModule {
                name,
                source_files: collect_source_files(path, module_paths),
                task_names: read_task_names(path),
                path: path.clone(),
            }
        })
        .collect()
}

/// Source files under a module directory, not descending into other
/// modules or generated output.
fn collect_source_files(module_path: &Path, all_modules: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(module_path)
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                if SKIPPED_DIRS.contains(&name.as_ref()) {
                    return false;
                }
                // A nested module owns its own files.
                if path != module_path && all_modules.iter().any(|m| m.as_path() == path) {
                    return false;
                }
            }
            true
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| SOURCE_EXTENSIONS.contains(&e))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    files
}

fn read_task_names(module_path: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for descriptor in ["build.gradle", "build.gradle.kts"] {
        let Ok(content) = fs::read_to_string(module_path.join(descriptor)) else {
            continue;
        };
        for capture in TASK_DECLARATION.captures_iter(&content) {
            let name = capture
                .get(1)
                .or_else(|| capture.get(2))
                .map(|m| m.as_str().to_string());
            if let Some(name) = name {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }
    names
}

fn read_properties(path: &Path) -> HashMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return HashMap::new();
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ModelProvider;
    use indoc::indoc;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn seed_wrapper(root: &Path, version: &str) {
        write(
            root,
            "gradle/wrapper/gradle-wrapper.properties",
            &format!(
                "distributionUrl=https\\://services.gradle.org/distributions/gradle-{version}-bin.zip\n"
            ),
        );
    }

    #[test]
    fn reads_version_modules_and_properties() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        seed_wrapper(root, "8.5");
        write(
            root,
            "settings.gradle",
            indoc! {r#"
                rootProject.name = 'demo'
                include ':app', ':core:util'
            "#},
        );
        write(
            root,
            "build.gradle",
            indoc! {r#"
                task docs {
                }
                tasks.register("lint") {
                }
            "#},
        );
        write(root, "app/build.gradle", "task appJar {\n}\n");
        write(root, "gradle.properties", "org.gradle.caching=true\n# comment\n");

        let model = LocalModelProvider::new().read(root).unwrap();

        assert_eq!(model.tool_version, ToolVersion::new(8, 5, 0));
        let names: Vec<_> = model.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["root", "app", "util"]);
        assert_eq!(
            model.modules[0].task_names,
            vec!["docs".to_string(), "lint".to_string()]
        );
        assert_eq!(model.property("org.gradle.caching"), Some("true"));
    }

    #[test]
    fn missing_wrapper_metadata_is_unreadable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "build.gradle", "");
        let err = LocalModelProvider::new().read(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ProjectUnreadable { .. }));
    }

    #[test]
    fn root_module_does_not_claim_nested_module_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        seed_wrapper(root, "8.5");
        write(root, "settings.gradle", "include ':app'\n");
        write(root, "build.gradle", "");
        write(root, "app/build.gradle", "");
        write(root, "app/src/main/java/App.java", "class App {}\n");

        let model = LocalModelProvider::new().read(root).unwrap();
        let root_files = &model.modules[0].source_files;
        assert!(root_files.iter().all(|f| !f.starts_with(root.join("app"))));
        let app_files = &model.modules[1].source_files;
        assert!(app_files
            .iter()
            .any(|f| f.ends_with("src/main/java/App.java")));
    }
}
