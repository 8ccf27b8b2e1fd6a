//! Project sizing and engine-mode selection.
//!
//! Computed fresh per run from the project model; never stored.

use crate::core::{ClassifiedFinding, FixClass, ProjectModel};
use serde::{Deserialize, Serialize};

/// File-count fallbacks: a project with few modules but a very large
/// declared-file count still sizes up.
const FILE_COUNT_MEDIUM: usize = 200;
const FILE_COUNT_LARGE: usize = 1000;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Apply the whole plan, one verification pass at the end
    Direct,
    /// Apply in per-module batches, verifying after each batch
    Staged,
    /// Refuse to apply automatically; plan goes back for human approval
    ManualReviewRequired,
}

/// Module-count boundaries for sizing. Documented defaults, tunable via
/// configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityThresholds {
    pub small_max_modules: usize,
    pub medium_max_modules: usize,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            small_max_modules: 5,
            medium_max_modules: 20,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityAssessment {
    pub size: ProjectSize,
    pub mode: EngineMode,
    pub module_count: usize,
    pub declared_file_count: usize,
}

pub fn assess(
    model: &ProjectModel,
    classified: &[ClassifiedFinding],
    thresholds: &ComplexityThresholds,
) -> ComplexityAssessment {
    let module_count = model.module_count();
    let declared_file_count = model.declared_file_count();

    let by_modules = if module_count <= thresholds.small_max_modules {
        ProjectSize::Small
    } else if module_count <= thresholds.medium_max_modules {
        ProjectSize::Medium
    } else {
        ProjectSize::Large
    };
    let by_files = if declared_file_count > FILE_COUNT_LARGE {
        ProjectSize::Large
    } else if declared_file_count > FILE_COUNT_MEDIUM {
        ProjectSize::Medium
    } else {
        ProjectSize::Small
    };
    let size = by_modules.max(by_files);

    let has_unsafe = classified
        .iter()
        .any(|c| c.fix_class == FixClass::Unsafe);

    let mode = match size {
        ProjectSize::Large if has_unsafe => EngineMode::ManualReviewRequired,
        ProjectSize::Large => EngineMode::Staged,
        _ => EngineMode::Direct,
    };

    ComplexityAssessment {
        size,
        mode,
        module_count,
        declared_file_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Finding, FindingCategory, ProjectModule, Severity, SourceLocation, ToolVersion,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn model_with_modules(count: usize) -> ProjectModel {
        ProjectModel {
            root: PathBuf::from("/p"),
            tool_version: ToolVersion::new(8, 5, 0),
            modules: (0..count)
                .map(|i| ProjectModule {
                    name: format!("m{i}"),
                    path: PathBuf::from(format!("/p/m{i}")),
                    source_files: vec![],
                    task_names: vec![],
                })
                .collect(),
            properties: HashMap::new(),
        }
    }

    fn unsafe_finding() -> ClassifiedFinding {
        let finding = Finding::new(
            FindingCategory::CredentialInScript,
            SourceLocation::line("/p/build.gradle", 4),
            r#"password = "hunter2""#,
            Severity::High,
        );
        ClassifiedFinding {
            finding,
            fix_class: FixClass::Unsafe,
            confidence: 0.5,
        }
    }

    #[test]
    fn sizes_follow_module_thresholds() {
        let thresholds = ComplexityThresholds::default();
        assert_eq!(
            assess(&model_with_modules(3), &[], &thresholds).size,
            ProjectSize::Small
        );
        assert_eq!(
            assess(&model_with_modules(12), &[], &thresholds).size,
            ProjectSize::Medium
        );
        assert_eq!(
            assess(&model_with_modules(25), &[], &thresholds).size,
            ProjectSize::Large
        );
    }

    #[test]
    fn large_projects_stage_and_unsafe_findings_force_review() {
        let thresholds = ComplexityThresholds::default();
        assert_eq!(
            assess(&model_with_modules(25), &[], &thresholds).mode,
            EngineMode::Staged
        );
        assert_eq!(
            assess(&model_with_modules(25), &[unsafe_finding()], &thresholds).mode,
            EngineMode::ManualReviewRequired
        );
        assert_eq!(
            assess(&model_with_modules(3), &[unsafe_finding()], &thresholds).mode,
            EngineMode::Direct
        );
    }
}
