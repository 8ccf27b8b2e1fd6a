//! The machine-readable run report.
//!
//! Every run produces one, whatever its outcome: an aborted or rolled-back
//! run still explains what was attempted. The schema constant ties stored
//! reports to the shape that wrote them.

use crate::core::{FixAction, FixPlan, PlanSummary, SkippedFile, StaleAction};
use crate::detect::signatures::CATALOG_VERSION;
use crate::orchestrator::complexity::ComplexityAssessment;
use crate::orchestrator::{ApplyOutcome, EngineState, RollbackOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const REPORT_SCHEMA: &str = "buildmend.report.v1";

/// Final outcome of a run, mapped one-to-one onto the process exit code.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing detected
    NoIssues,
    /// Plan generated but not applied (analyze, dry run, or nothing automatic)
    Planned,
    /// Orchestrator refused to apply without human approval
    ManualReviewRequired,
    /// Plan applied and verified
    Committed,
    /// Verification failed and the checkpoint was restored
    RolledBack,
    /// Run stopped before any mutation
    Aborted,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::NoIssues => 0,
            RunStatus::Planned | RunStatus::ManualReviewRequired => 1,
            RunStatus::Committed => 2,
            RunStatus::RolledBack => 3,
            RunStatus::Aborted => 4,
        }
    }

    pub fn from_engine_state(state: EngineState, applied_anything: bool) -> Self {
        match state {
            EngineState::Committed if applied_anything => RunStatus::Committed,
            EngineState::Committed => RunStatus::Planned,
            EngineState::RolledBack => RunStatus::RolledBack,
            EngineState::Aborted => RunStatus::Aborted,
            EngineState::ManualReviewRequired => RunStatus::ManualReviewRequired,
            // Non-terminal states never leave the orchestrator.
            _ => RunStatus::Aborted,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::NoIssues => "no issues",
            RunStatus::Planned => "planned",
            RunStatus::ManualReviewRequired => "manual review required",
            RunStatus::Committed => "committed",
            RunStatus::RolledBack => "rolled back",
            RunStatus::Aborted => "aborted",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema: String,
    pub generated_at: DateTime<Utc>,
    pub project_path: PathBuf,
    pub tool_version: String,
    pub catalog_version: String,
    pub status: RunStatus,
    pub summary: PlanSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub planned_actions: Vec<FixAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_actions: Vec<FixAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stale_actions: Vec<StaleAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<ComplexityAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RunReport {
    pub fn new(project_path: PathBuf, tool_version: String, status: RunStatus) -> Self {
        Self {
            schema: REPORT_SCHEMA.to_string(),
            generated_at: Utc::now(),
            project_path,
            tool_version,
            catalog_version: CATALOG_VERSION.to_string(),
            status,
            summary: PlanSummary::default(),
            planned_actions: vec![],
            applied_actions: vec![],
            stale_actions: vec![],
            skipped_files: vec![],
            assessment: None,
            rollback: None,
            preview: None,
            detail: None,
        }
    }

    /// Report for a run that never produced a model.
    pub fn aborted(project_path: PathBuf, detail: String) -> Self {
        let mut report = Self::new(project_path, "unknown".to_string(), RunStatus::Aborted);
        report.detail = Some(detail);
        report
    }

    pub fn with_plan(mut self, plan: &FixPlan) -> Self {
        self.summary = plan.summary.clone();
        self.planned_actions = plan.actions.clone();
        self
    }

    pub fn with_skipped(mut self, skipped: Vec<SkippedFile>) -> Self {
        self.skipped_files = skipped;
        self
    }

    pub fn with_outcome(mut self, outcome: ApplyOutcome) -> Self {
        self.status = RunStatus::from_engine_state(outcome.state, !outcome.applied.is_empty());
        self.assessment = Some(outcome.assessment);
        self.applied_actions = outcome.applied;
        self.stale_actions = outcome.stale;
        self.rollback = outcome.rollback;
        if self.detail.is_none() {
            self.detail = outcome.detail;
        }
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_documented_contract() {
        assert_eq!(RunStatus::NoIssues.exit_code(), 0);
        assert_eq!(RunStatus::Planned.exit_code(), 1);
        assert_eq!(RunStatus::ManualReviewRequired.exit_code(), 1);
        assert_eq!(RunStatus::Committed.exit_code(), 2);
        assert_eq!(RunStatus::RolledBack.exit_code(), 3);
        assert_eq!(RunStatus::Aborted.exit_code(), 4);
    }

    #[test]
    fn committed_without_applied_actions_reads_as_planned() {
        assert_eq!(
            RunStatus::from_engine_state(EngineState::Committed, false),
            RunStatus::Planned
        );
        assert_eq!(
            RunStatus::from_engine_state(EngineState::Committed, true),
            RunStatus::Committed
        );
    }

    #[test]
    fn report_serializes_with_schema_and_status() {
        let report = RunReport::new(
            PathBuf::from("/p"),
            "8.5.0".to_string(),
            RunStatus::NoIssues,
        );
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("buildmend.report.v1"));
        assert!(json.contains("no_issues"));
    }
}
