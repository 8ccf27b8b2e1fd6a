use buildmend::classify::classify_all;
use buildmend::core::errors::Result;
use buildmend::core::{FindingCategory, FixClass, ProjectModel, ProjectModule, ToolVersion};
use buildmend::detect::detect;
use buildmend::orchestrator::checkpoint::{
    CheckpointHandle, CheckpointProvider, InMemoryCheckpointProvider,
};
use buildmend::orchestrator::complexity::{EngineMode, ProjectSize};
use buildmend::orchestrator::{EngineState, Orchestrator};
use buildmend::plan::{generate, DEFAULT_AUTO_THRESHOLD};
use buildmend::report::{RunReport, RunStatus};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn full_properties() -> HashMap<String, String> {
    [
        ("org.gradle.caching", "true"),
        ("org.gradle.parallel", "true"),
        ("org.gradle.configuration-cache", "true"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn many_module_model(root: &Path, count: usize) -> ProjectModel {
    let mut modules = vec![ProjectModule {
        name: "root".into(),
        path: root.to_path_buf(),
        source_files: vec![],
        task_names: vec![],
    }];
    modules.extend((0..count).map(|i| ProjectModule {
        name: format!("m{i}"),
        path: root.join(format!("m{i}")),
        source_files: vec![],
        task_names: vec![],
    }));

    ProjectModel {
        root: root.to_path_buf(),
        tool_version: ToolVersion::new(8, 5, 0),
        modules,
        properties: full_properties(),
    }
}

#[derive(Default)]
struct CountingCheckpoint {
    creates: usize,
}

impl CheckpointProvider for CountingCheckpoint {
    fn create(&mut self) -> Result<CheckpointHandle> {
        self.creates += 1;
        Ok(CheckpointHandle::new("counted"))
    }

    fn restore(&mut self, _handle: &CheckpointHandle) -> Result<()> {
        Ok(())
    }

    fn discard(&mut self, _handle: CheckpointHandle) {}
}

/// A large project with a credential-like finding is never auto-applied:
/// no checkpoint is requested and no file is touched.
#[test]
fn large_project_with_unsafe_finding_requires_manual_review() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let original = "task docs {\n}\napiKey = \"sk-123456\"\n";
    let build = write(root, "build.gradle", original);

    let model = many_module_model(root, 24);
    let detection = detect(&model, &[build.clone()]);
    let classified = classify_all(&detection.findings);
    assert!(classified
        .iter()
        .any(|c| c.fix_class == FixClass::Unsafe));

    let plan = generate(&classified, DEFAULT_AUTO_THRESHOLD);
    assert!(!plan.actions.is_empty());

    let mut checkpoint = CountingCheckpoint::default();
    let outcome = Orchestrator::new(&model, &mut checkpoint).execute(&plan, &classified);

    assert_eq!(outcome.state, EngineState::ManualReviewRequired);
    assert_eq!(outcome.assessment.size, ProjectSize::Large);
    assert_eq!(outcome.assessment.mode, EngineMode::ManualReviewRequired);
    assert_eq!(checkpoint.creates, 0);
    assert!(outcome.applied.is_empty());
    assert_eq!(fs::read_to_string(&build).unwrap(), original);

    // The plan still goes back for human approval via the report.
    let report = RunReport::new(
        root.to_path_buf(),
        model.tool_version.to_string(),
        RunStatus::Planned,
    )
    .with_plan(&plan)
    .with_outcome(outcome);
    assert_eq!(report.status, RunStatus::ManualReviewRequired);
    assert_eq!(report.exit_code(), 1);
    assert!(!report.planned_actions.is_empty());
}

/// A large project without unsafe findings runs staged: per-module batches,
/// each verified, everything applied by the end.
#[test]
fn large_project_without_unsafe_findings_applies_in_staged_batches() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let first = write(root, "m0/build.gradle", "task alpha {\n}\n");
    let second = write(root, "m1/build.gradle", "task beta {\n}\n");

    let model = many_module_model(root, 24);
    let files = vec![first.clone(), second.clone()];
    let detection = detect(&model, &files);
    let classified = classify_all(&detection.findings);
    let plan = generate(&classified, DEFAULT_AUTO_THRESHOLD);
    assert_eq!(plan.actions.len(), 2);

    let mut checkpoint = InMemoryCheckpointProvider::new(files);
    let outcome = Orchestrator::new(&model, &mut checkpoint).execute(&plan, &classified);

    assert_eq!(outcome.assessment.mode, EngineMode::Staged);
    assert_eq!(outcome.state, EngineState::Committed);
    assert_eq!(outcome.applied.len(), 2);

    assert!(fs::read_to_string(&first)
        .unwrap()
        .contains(r#"tasks.register("alpha") {"#));
    assert!(fs::read_to_string(&second)
        .unwrap()
        .contains(r#"tasks.register("beta") {"#));
}

/// Cross-module findings carry the confidence penalty, so an identical
/// snippet classifies lower in a submodule than at the root.
#[test]
fn cross_module_findings_classify_below_root_findings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let root_file = write(root, "build.gradle", "task docs {\n}\n");
    let sub_file = write(root, "m0/build.gradle", "task docs {\n}\n");

    let model = many_module_model(root, 2);
    let detection = detect(&model, &[root_file, sub_file]);
    let classified = classify_all(&detection.findings);
    assert_eq!(classified.len(), 2);

    let root_conf = classified
        .iter()
        .find(|c| !c.finding.context.cross_module)
        .unwrap()
        .confidence;
    let sub_conf = classified
        .iter()
        .find(|c| c.finding.context.cross_module)
        .unwrap()
        .confidence;
    assert!(sub_conf < root_conf);
}

/// End-to-end partial application: one file drifts between planning and
/// apply; the run still commits and reports the stale action.
#[test]
fn drifted_file_reports_stale_but_run_still_commits() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let stable = write(root, "build.gradle", "jcenter()\n");
    let drifting = write(root, "legacy.gradle", "jcenter()\n");

    let model = many_module_model(root, 0);
    let files = vec![stable.clone(), drifting.clone()];
    let detection = detect(&model, &files);
    let classified = classify_all(&detection.findings);
    let plan = generate(&classified, DEFAULT_AUTO_THRESHOLD);
    assert_eq!(plan.actions.len(), 2);

    fs::write(&drifting, "mavenCentral()\n").unwrap();

    let mut checkpoint = InMemoryCheckpointProvider::new(files);
    let outcome = Orchestrator::new(&model, &mut checkpoint).execute(&plan, &classified);

    assert_eq!(outcome.state, EngineState::Committed);
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.stale.len(), 1);
    assert_eq!(outcome.stale[0].location.file, drifting);
    assert_eq!(fs::read_to_string(&stable).unwrap(), "mavenCentral()\n");

    let report = RunReport::new(
        root.to_path_buf(),
        model.tool_version.to_string(),
        RunStatus::Planned,
    )
    .with_plan(&plan)
    .with_outcome(outcome);
    assert_eq!(report.status, RunStatus::Committed);
    assert_eq!(report.exit_code(), 2);
    assert_eq!(report.stale_actions.len(), 1);
}

/// Findings never survive the run that produced them: a second detection
/// pass on changed text reflects only the new content.
#[test]
fn findings_are_not_cached_across_runs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let build = write(root, "build.gradle", "task docs {\n}\n");

    let model = many_module_model(root, 0);
    let first = detect(&model, &[build.clone()]);
    assert_eq!(first.findings.len(), 1);

    fs::write(&build, "tasks.register(\"docs\") {\n}\n").unwrap();
    let second = detect(&model, &[build]);
    assert!(second
        .findings
        .iter()
        .all(|f| f.category != FindingCategory::EagerTask));
}
