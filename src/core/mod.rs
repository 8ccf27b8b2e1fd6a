pub mod errors;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Build tool version as a semantic triple.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ToolVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string, tolerating a missing patch component
    /// ("8.5" parses as 8.5.0). Anything else is rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.trim().splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        Some(Self::new(major, minor, patch))
    }

    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    pub fn below(&self, major: u64, minor: u64) -> bool {
        (self.major, self.minor) < (major, minor)
    }
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One module of the build project as declared by the provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectModule {
    pub name: String,
    pub path: PathBuf,
    pub source_files: Vec<PathBuf>,
    pub task_names: Vec<String>,
}

/// Immutable snapshot of a build project at analysis time.
///
/// Created once per run by the project model reader and never mutated;
/// stages receive it by reference. Findings derived from it are scoped to
/// the run that produced them because source text may change between
/// invocations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectModel {
    pub root: PathBuf,
    pub tool_version: ToolVersion,
    pub modules: Vec<ProjectModule>,
    pub properties: HashMap<String, String>,
}

impl ProjectModel {
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn declared_file_count(&self) -> usize {
        self.modules.iter().map(|m| m.source_files.len()).sum()
    }

    /// The module owning a file, by longest path-prefix match.
    pub fn module_for(&self, file: &Path) -> Option<&ProjectModule> {
        self.modules
            .iter()
            .filter(|m| file.starts_with(&m.path))
            .max_by_key(|m| m.path.components().count())
    }

    /// Whether a file belongs to the root module. Files not owned by any
    /// declared module are attributed to the root.
    pub fn in_root_module(&self, file: &Path) -> bool {
        match self.module_for(file) {
            Some(module) => module.path == self.root,
            None => true,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Category of a detected build-script issue.
///
/// The catalog in `detect::signatures` is keyed by this enum, so adding a
/// category without detection and classification rules fails to compile.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    EagerTask,
    ProjectAccessAtExecution,
    SystemPropertyAccess,
    DeprecatedApi,
    PerformanceSettingMissing,
    CredentialInScript,
    InsecureProtocol,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        static DISPLAY_STRINGS: &[(FindingCategory, &str)] = &[
            (FindingCategory::EagerTask, "eager-task"),
            (
                FindingCategory::ProjectAccessAtExecution,
                "project-access-at-execution",
            ),
            (
                FindingCategory::SystemPropertyAccess,
                "system-property-access",
            ),
            (FindingCategory::DeprecatedApi, "deprecated-api"),
            (
                FindingCategory::PerformanceSettingMissing,
                "performance-setting-missing",
            ),
            (FindingCategory::CredentialInScript, "credential-in-script"),
            (FindingCategory::InsecureProtocol, "insecure-protocol"),
        ];

        DISPLAY_STRINGS
            .iter()
            .find(|(c, _)| c == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown")
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        write!(f, "{s}")
    }
}

/// File path plus a 1-based inclusive line range.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            start_line: line,
            end_line: line,
        }
    }

    pub fn span(file: impl Into<PathBuf>, start_line: usize, end_line: usize) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    /// Ranges overlap only within the same file.
    pub fn overlaps(&self, other: &SourceLocation) -> bool {
        self.file == other.file
            && self.start_line <= other.end_line
            && other.start_line <= self.end_line
    }
}

/// Risk context captured at detection time.
///
/// The classifier is a pure function of the finding, so everything it
/// penalizes must already be recorded here.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FindingContext {
    /// Match sits inside a multi-line string or template literal
    pub in_multiline_string: bool,
    /// Match is in a file outside the root module
    pub cross_module: bool,
    /// More than one candidate replacement is plausible for the match
    pub ambiguous_replacement: bool,
}

/// One detected issue instance. Immutable; owned by the run that produced
/// it and never cached across runs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub category: FindingCategory,
    pub location: SourceLocation,
    pub matched_text: String,
    pub severity: Severity,
    pub context: FindingContext,
}

impl Finding {
    pub fn new(
        category: FindingCategory,
        location: SourceLocation,
        matched_text: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let id = format!(
            "{}-{}-{}",
            category,
            location.file.display(),
            location.start_line
        );
        Self {
            id,
            category,
            location,
            matched_text: matched_text.into(),
            severity,
            context: FindingContext::default(),
        }
    }

    pub fn with_context(mut self, context: FindingContext) -> Self {
        self.context = context;
        self
    }
}

/// How a finding may be remediated.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum FixClass {
    /// Safe to apply automatically
    Auto,
    /// Needs human judgment
    Manual,
    /// Never auto-applied, whatever the confidence
    Unsafe,
}

impl std::fmt::Display for FixClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FixClass::Auto => "auto",
            FixClass::Manual => "manual",
            FixClass::Unsafe => "unsafe",
        };
        write!(f, "{s}")
    }
}

/// A finding plus its fix class and confidence score. One-to-one with the
/// finding it wraps; both share the run's lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedFinding {
    pub finding: Finding,
    pub fix_class: FixClass,
    pub confidence: f64,
}

/// One concrete, reversible text edit.
///
/// An empty `original_text` marks an insertion: the replacement is appended
/// at the anchor line instead of substituted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixAction {
    pub location: SourceLocation,
    pub original_text: String,
    pub replacement_text: String,
    pub source_finding_id: String,
    pub category: FindingCategory,
}

impl FixAction {
    pub fn is_insertion(&self) -> bool {
        self.original_text.is_empty()
    }
}

/// Why a finding landed on the manual-review list instead of in the plan.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ManualReviewReason {
    ManualClass,
    UnsafeClass,
    BelowThreshold,
    OverlapDemoted,
    NoRewriteAvailable,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualReviewItem {
    pub finding_id: String,
    pub category: FindingCategory,
    pub location: SourceLocation,
    pub reason: ManualReviewReason,
}

/// Counts and effort estimate for a generated plan.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub findings_total: usize,
    pub counts_by_category: BTreeMap<FindingCategory, usize>,
    pub files_touched: usize,
    pub estimated_lines_changed: usize,
    pub estimated_minutes: u64,
    pub auto_threshold: f64,
    pub manual_review: Vec<ManualReviewItem>,
}

/// Ordered, deduplicated set of proposed edits plus summary.
///
/// Immutable once generated and consumed exactly once by the applier;
/// regenerate rather than reuse if the project changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FixPlan {
    pub actions: Vec<FixAction>,
    pub summary: PlanSummary,
}

impl FixPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Files touched by at least one action, in plan order, deduplicated.
    pub fn touched_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for action in &self.actions {
            if !files.contains(&action.location.file) {
                files.push(action.location.file.clone());
            }
        }
        files
    }
}

/// A file the detector could not scan. Recorded, never raised.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// An action whose live file content no longer matched `original_text`.
/// Fatal to that one action (and the rest of its file), not to the run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaleAction {
    pub location: SourceLocation,
    pub source_finding_id: String,
    pub detail: String,
}
