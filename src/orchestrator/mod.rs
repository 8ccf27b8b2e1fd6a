//! Transformation applier and run orchestration.
//!
//! A run moves through `Assessing → Checkpointed → Applying → Verifying`
//! and ends in exactly one of `Committed`, `RolledBack`, `Aborted`, or
//! `ManualReviewRequired`. No file is touched before a checkpoint exists,
//! and a verification failure always restores from it. Cancellation is
//! honored between stages only: once a file write begins it completes, so
//! an interrupted run never leaves a half-written script.

pub mod checkpoint;
pub mod complexity;

use crate::core::{
    ClassifiedFinding, FindingCategory, FixAction, FixPlan, ProjectModel, SourceLocation,
    StaleAction,
};
use crate::detect;
use checkpoint::CheckpointProvider;
use complexity::{assess, ComplexityAssessment, ComplexityThresholds, EngineMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Assessing,
    Checkpointed,
    Applying,
    Verifying,
    Committed,
    RolledBack,
    Aborted,
    ManualReviewRequired,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Assessing => "assessing",
            EngineState::Checkpointed => "checkpointed",
            EngineState::Applying => "applying",
            EngineState::Verifying => "verifying",
            EngineState::Committed => "committed",
            EngineState::RolledBack => "rolled_back",
            EngineState::Aborted => "aborted",
            EngineState::ManualReviewRequired => "manual_review_required",
        };
        write!(f, "{s}")
    }
}

/// Best-effort cancellation, checked between stages.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RollbackOutcome {
    pub attempted: Vec<FixAction>,
    pub restored: bool,
    pub detail: String,
}

/// What the applier did, in full. Every exit path fills this in; the run
/// report is assembled from it even on abort or rollback.
#[derive(Clone, Debug)]
pub struct ApplyOutcome {
    pub state: EngineState,
    pub assessment: ComplexityAssessment,
    pub applied: Vec<FixAction>,
    pub stale: Vec<StaleAction>,
    pub rollback: Option<RollbackOutcome>,
    pub detail: Option<String>,
}

impl ApplyOutcome {
    fn terminal(state: EngineState, assessment: ComplexityAssessment) -> Self {
        Self {
            state,
            assessment,
            applied: Vec::new(),
            stale: Vec::new(),
            rollback: None,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub struct Orchestrator<'a> {
    model: &'a ProjectModel,
    checkpoint: &'a mut dyn CheckpointProvider,
    thresholds: ComplexityThresholds,
    cancel: CancellationToken,
}

impl<'a> Orchestrator<'a> {
    pub fn new(model: &'a ProjectModel, checkpoint: &'a mut dyn CheckpointProvider) -> Self {
        Self {
            model,
            checkpoint,
            thresholds: ComplexityThresholds::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ComplexityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Execute an approved plan. Consumes the plan logically: if the
    /// project changes afterwards, regenerate rather than re-apply.
    pub fn execute(mut self, plan: &FixPlan, classified: &[ClassifiedFinding]) -> ApplyOutcome {
        let assessment = assess(self.model, classified, &self.thresholds);
        log::info!(
            "assessed project: {} module(s), size {:?}, mode {:?}",
            assessment.module_count,
            assessment.size,
            assessment.mode
        );

        if assessment.mode == EngineMode::ManualReviewRequired {
            return ApplyOutcome::terminal(EngineState::ManualReviewRequired, assessment)
                .with_detail("project size and unsafe findings require human approval");
        }

        if plan.is_empty() {
            return ApplyOutcome::terminal(EngineState::Committed, assessment)
                .with_detail("no automatic actions in plan");
        }

        let handle = match self.checkpoint.create() {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("checkpoint creation failed, aborting before any mutation: {err}");
                return ApplyOutcome::terminal(EngineState::Aborted, assessment)
                    .with_detail(err.to_string());
            }
        };

        let batches = batch_actions(plan, self.model, assessment.mode);
        let mut applied: Vec<FixAction> = Vec::new();
        let mut stale: Vec<StaleAction> = Vec::new();

        for (batch_idx, batch) in batches.iter().enumerate() {
            if self.cancel.is_cancelled() {
                // Nothing unverified on disk at a batch boundary; keep the
                // verified work and report what was left undone.
                let remaining: usize = batches[batch_idx..].iter().map(Vec::len).sum();
                self.checkpoint.discard(handle);
                return ApplyOutcome {
                    state: EngineState::Committed,
                    assessment,
                    applied,
                    stale,
                    rollback: None,
                    detail: Some(format!(
                        "cancelled at batch boundary; {remaining} action(s) not applied"
                    )),
                };
            }

            log::debug!(
                "applying batch {}/{} ({} action(s))",
                batch_idx + 1,
                batches.len(),
                batch.len()
            );
            let (batch_applied, batch_stale) = apply_actions(batch);
            stale.extend(batch_stale);

            if self.cancel.is_cancelled() {
                let outcome = self.roll_back(
                    &handle,
                    applied.iter().chain(&batch_applied).cloned().collect(),
                    "cancelled before verification",
                );
                return ApplyOutcome {
                    state: EngineState::RolledBack,
                    assessment,
                    applied: Vec::new(),
                    stale,
                    rollback: Some(outcome),
                    detail: Some("cancelled before verification".to_string()),
                };
            }

            if let Some(refired) = verify_batch(self.model, &batch_applied) {
                let attempted: Vec<FixAction> =
                    applied.iter().chain(&batch_applied).cloned().collect();
                let outcome = self.roll_back(
                    &handle,
                    attempted,
                    &format!("{refired} finding(s) refired after apply"),
                );
                return ApplyOutcome {
                    state: EngineState::RolledBack,
                    assessment,
                    applied: Vec::new(),
                    stale,
                    rollback: Some(outcome),
                    detail: Some(format!("verification failed: {refired} finding(s) refired")),
                };
            }

            applied.extend(batch_applied);
        }

        self.checkpoint.discard(handle);
        ApplyOutcome {
            state: EngineState::Committed,
            assessment,
            applied,
            stale,
            rollback: None,
            detail: None,
        }
    }

    fn roll_back(
        &mut self,
        handle: &checkpoint::CheckpointHandle,
        attempted: Vec<FixAction>,
        reason: &str,
    ) -> RollbackOutcome {
        log::warn!("rolling back: {reason}");
        match self.checkpoint.restore(handle) {
            Ok(()) => RollbackOutcome {
                attempted,
                restored: true,
                detail: reason.to_string(),
            },
            Err(err) => RollbackOutcome {
                attempted,
                restored: false,
                detail: format!("{reason}; restore failed: {err}"),
            },
        }
    }
}

/// Partition plan actions into apply batches. `Direct` mode is a single
/// batch; `Staged` mode batches per owning module, in module-path order,
/// and batch N+1 is never started before batch N verifies.
fn batch_actions(plan: &FixPlan, model: &ProjectModel, mode: EngineMode) -> Vec<Vec<FixAction>> {
    match mode {
        EngineMode::Staged => {
            let mut by_module: BTreeMap<PathBuf, Vec<FixAction>> = BTreeMap::new();
            for action in &plan.actions {
                let module_path = model
                    .module_for(&action.location.file)
                    .map(|m| m.path.clone())
                    .unwrap_or_else(|| model.root.clone());
                by_module.entry(module_path).or_default().push(action.clone());
            }
            by_module.into_values().collect()
        }
        _ => vec![plan.actions.clone()],
    }
}

/// Apply one batch, file by file in plan order. A mismatch between an
/// action's recorded original text and the live file aborts the remaining
/// actions in that file only; other files continue.
fn apply_actions(batch: &[FixAction]) -> (Vec<FixAction>, Vec<StaleAction>) {
    let mut by_file: BTreeMap<PathBuf, Vec<&FixAction>> = BTreeMap::new();
    for action in batch {
        by_file
            .entry(action.location.file.clone())
            .or_default()
            .push(action);
    }

    let mut applied = Vec::new();
    let mut stale = Vec::new();

    for (file, actions) in by_file {
        match apply_file(&file, &actions) {
            Ok((file_applied, file_stale)) => {
                applied.extend(file_applied);
                stale.extend(file_stale);
            }
            Err(detail) => {
                // The whole file failed (unreadable or unwritable): every
                // action in it is reported stale, none applied.
                stale.extend(actions.iter().map(|a| StaleAction {
                    location: a.location.clone(),
                    source_finding_id: a.source_finding_id.clone(),
                    detail: detail.clone(),
                }));
            }
        }
    }

    (applied, stale)
}

type FileApplyResult = std::result::Result<(Vec<FixAction>, Vec<StaleAction>), String>;

fn apply_file(file: &PathBuf, actions: &[&FixAction]) -> FileApplyResult {
    let (content, existed) = match fs::read_to_string(file) {
        Ok(content) => (content, true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => (String::new(), false),
        Err(err) => return Err(format!("cannot read {}: {err}", file.display())),
    };

    let had_trailing_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut applied = Vec::new();
    let mut stale = Vec::new();
    let mut mutated = false;

    for action in actions {
        if action.is_insertion() {
            lines.push(action.replacement_text.clone());
            applied.push((*action).clone());
            mutated = true;
            continue;
        }

        let start = action.location.start_line;
        let end = action.location.end_line.min(lines.len());
        if start == 0 || start > lines.len() {
            stale.push(StaleAction {
                location: action.location.clone(),
                source_finding_id: action.source_finding_id.clone(),
                detail: "location is out of range in the live file".to_string(),
            });
            break;
        }

        let segment = lines[start - 1..end].join("\n");
        if !segment.contains(&action.original_text) {
            stale.push(StaleAction {
                location: action.location.clone(),
                source_finding_id: action.source_finding_id.clone(),
                detail: "original text no longer present at location".to_string(),
            });
            break;
        }

        let replaced = segment.replacen(&action.original_text, &action.replacement_text, 1);
        lines.splice(start - 1..end, replaced.lines().map(String::from));
        applied.push((*action).clone());
        mutated = true;
    }

    if mutated {
        let mut output = lines.join("\n");
        if had_trailing_newline || !existed {
            output.push('\n');
        }
        fs::write(file, output).map_err(|err| format!("cannot write {}: {err}", file.display()))?;
    }

    Ok((applied, stale))
}

/// Re-run detection restricted to the just-fixed categories over the
/// mutated files. Returns the refire count on failure, `None` on success.
/// Only text-level categories are re-checkable here: model-derived
/// findings would need a fresh model read, and their insertions are
/// already validated by the apply step itself.
fn verify_batch(model: &ProjectModel, batch_applied: &[FixAction]) -> Option<usize> {
    let replaced: Vec<&FixAction> = batch_applied
        .iter()
        .filter(|a| !a.is_insertion())
        .collect();
    if replaced.is_empty() {
        return None;
    }

    let categories: BTreeSet<FindingCategory> = replaced.iter().map(|a| a.category).collect();
    let files: BTreeSet<PathBuf> = replaced
        .iter()
        .map(|a| a.location.file.clone())
        .collect();
    let files: Vec<PathBuf> = files.into_iter().collect();

    let rescan = detect::detect_text(model, &files, Some(&categories));
    let locations: Vec<&SourceLocation> = replaced.iter().map(|a| &a.location).collect();

    let refired = rescan
        .findings
        .iter()
        .filter(|f| locations.iter().any(|loc| f.location.overlaps(loc)))
        .count();

    if refired > 0 {
        log::warn!("verification found {refired} refired finding(s)");
        Some(refired)
    } else {
        None
    }
}
