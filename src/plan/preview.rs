//! Diff-like rendering of a plan. Read-only: the preview is computed from
//! the plan alone and never consults or mutates the filesystem.

use crate::core::FixPlan;
use std::fmt::Write as _;
use std::path::Path;

pub fn render(plan: &FixPlan, root: &Path) -> String {
    let mut out = String::new();
    let mut current_file: Option<&Path> = None;

    for action in &plan.actions {
        let file = action.location.file.as_path();
        if current_file != Some(file) {
            let display = pathdiff::diff_paths(file, root).unwrap_or_else(|| file.to_path_buf());
            let _ = writeln!(out, "--- a/{}", display.display());
            let _ = writeln!(out, "+++ b/{}", display.display());
            current_file = Some(file);
        }

        let _ = writeln!(out, "@@ line {} @@", action.location.start_line);
        if action.is_insertion() {
            let _ = writeln!(out, "+{}", action.replacement_text);
        } else {
            let _ = writeln!(out, "-{}", action.original_text);
            let _ = writeln!(out, "+{}", action.replacement_text);
        }
    }

    if !plan.summary.manual_review.is_empty() {
        let _ = writeln!(
            out,
            "# {} finding(s) require manual review",
            plan.summary.manual_review.len()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        FindingCategory, FixAction, PlanSummary, SourceLocation,
    };
    use std::path::PathBuf;

    #[test]
    fn renders_replacement_and_insertion_hunks() {
        let plan = FixPlan {
            actions: vec![
                FixAction {
                    location: SourceLocation::line("/p/build.gradle", 3),
                    original_text: "task docs {".into(),
                    replacement_text: r#"tasks.register("docs") {"#.into(),
                    source_finding_id: "eager-task-/p/build.gradle-3".into(),
                    category: FindingCategory::EagerTask,
                },
                FixAction {
                    location: SourceLocation::line("/p/gradle.properties", 1),
                    original_text: String::new(),
                    replacement_text: "org.gradle.caching=true".into(),
                    source_finding_id: "performance-setting-missing-/p/gradle.properties-1".into(),
                    category: FindingCategory::PerformanceSettingMissing,
                },
            ],
            summary: PlanSummary::default(),
        };

        let rendered = render(&plan, &PathBuf::from("/p"));
        assert!(rendered.contains("--- a/build.gradle"));
        assert!(rendered.contains("-task docs {"));
        assert!(rendered.contains(r#"+tasks.register("docs") {"#));
        assert!(rendered.contains("+++ b/gradle.properties"));
        assert!(rendered.contains("+org.gradle.caching=true"));
    }
}
