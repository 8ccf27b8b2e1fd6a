use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Locates the build-script files a detection pass scans: build and
/// settings scripts plus `gradle.properties`, honoring gitignore rules and
/// configured ignore globs. Results are sorted so downstream stages see a
/// stable file order.
pub struct BuildScriptWalker {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl BuildScriptWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if !is_build_script(path) {
            return false;
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.ignore_patterns {
            if glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
            {
                return false;
            }
        }

        true
    }
}

fn is_build_script(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == "gradle.properties" || name.ends_with(".gradle") || name.ends_with(".gradle.kts")
}

pub fn find_build_scripts(root: &Path, ignore_patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    BuildScriptWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_build_scripts_and_skips_ignored_patterns() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("build.gradle"), "").unwrap();
        fs::write(root.join("settings.gradle.kts"), "").unwrap();
        fs::write(root.join("gradle.properties"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::create_dir_all(root.join("legacy")).unwrap();
        fs::write(root.join("legacy/build.gradle"), "").unwrap();

        let files = find_build_scripts(root, vec!["**/legacy/**".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["build.gradle", "gradle.properties", "settings.gradle.kts"]
        );
    }
}
