//! Fix plan generation.
//!
//! Only `Auto` findings at or above the threshold become actions; everything
//! else lands on the manual-review list with a reason. Candidate actions are
//! processed in the detector's deterministic order, and a later action whose
//! range overlaps an accepted one in the same file is rejected and its
//! finding demoted to manual review. Generation never touches the
//! filesystem; the plan is inert until the orchestrator consumes it.

pub mod preview;

use crate::core::{
    ClassifiedFinding, FindingCategory, FixAction, FixClass, FixPlan, ManualReviewItem,
    ManualReviewReason, PlanSummary,
};
use crate::detect::signatures;
use std::collections::BTreeMap;

pub const DEFAULT_AUTO_THRESHOLD: f64 = 0.75;

pub fn generate(classified: &[ClassifiedFinding], auto_threshold: f64) -> FixPlan {
    let mut ordered: Vec<&ClassifiedFinding> = classified.iter().collect();
    ordered.sort_by(|a, b| {
        (
            &a.finding.location.file,
            a.finding.location.start_line,
            a.finding.location.end_line,
            a.finding.category,
            &a.finding.matched_text,
        )
            .cmp(&(
                &b.finding.location.file,
                b.finding.location.start_line,
                b.finding.location.end_line,
                b.finding.category,
                &b.finding.matched_text,
            ))
    });

    let mut actions: Vec<FixAction> = Vec::new();
    let mut manual_review: Vec<ManualReviewItem> = Vec::new();
    let mut counts_by_category: BTreeMap<FindingCategory, usize> = BTreeMap::new();

    for classified_finding in ordered {
        let finding = &classified_finding.finding;
        *counts_by_category.entry(finding.category).or_default() += 1;

        let demotion = match classified_finding.fix_class {
            FixClass::Manual => Some(ManualReviewReason::ManualClass),
            FixClass::Unsafe => Some(ManualReviewReason::UnsafeClass),
            FixClass::Auto if classified_finding.confidence < auto_threshold => {
                Some(ManualReviewReason::BelowThreshold)
            }
            FixClass::Auto => None,
        };
        if let Some(reason) = demotion {
            manual_review.push(manual_item(classified_finding, reason));
            continue;
        }

        let Some((original_text, replacement_text)) = replacement_for(finding) else {
            manual_review.push(manual_item(
                classified_finding,
                ManualReviewReason::NoRewriteAvailable,
            ));
            continue;
        };

        if actions
            .iter()
            .any(|accepted| accepted.location.overlaps(&finding.location))
        {
            manual_review.push(manual_item(
                classified_finding,
                ManualReviewReason::OverlapDemoted,
            ));
            continue;
        }

        actions.push(FixAction {
            location: finding.location.clone(),
            original_text,
            replacement_text,
            source_finding_id: finding.id.clone(),
            category: finding.category,
        });
    }

    let summary = PlanSummary {
        findings_total: classified.len(),
        files_touched: count_files(&actions),
        estimated_lines_changed: actions
            .iter()
            .map(|a| a.location.end_line - a.location.start_line + 1)
            .sum(),
        estimated_minutes: estimate_minutes(actions.len(), manual_review.len()),
        auto_threshold,
        counts_by_category,
        manual_review,
    };

    FixPlan { actions, summary }
}

fn manual_item(classified: &ClassifiedFinding, reason: ManualReviewReason) -> ManualReviewItem {
    ManualReviewItem {
        finding_id: classified.finding.id.clone(),
        category: classified.finding.category,
        location: classified.finding.location.clone(),
        reason,
    }
}

/// Resolve the concrete edit for a finding from the signature catalog.
/// Missing-setting findings become insertions (empty original text); all
/// others replace the matched snippet with the first rewrite candidate.
fn replacement_for(finding: &crate::core::Finding) -> Option<(String, String)> {
    match finding.category {
        FindingCategory::PerformanceSettingMissing => {
            signatures::setting_insertion(&finding.matched_text)
                .map(|text| (String::new(), text))
        }
        _ => signatures::rewrite_candidates(finding.category, &finding.matched_text)
            .into_iter()
            .next()
            .map(|rewritten| (finding.matched_text.clone(), rewritten)),
    }
}

fn count_files(actions: &[FixAction]) -> usize {
    let mut files: Vec<_> = actions.iter().map(|a| &a.location.file).collect();
    files.dedup();
    files.len()
}

/// Rough effort estimate: a minute per automated action, ten per item left
/// to a human.
fn estimate_minutes(auto_actions: usize, manual_items: usize) -> u64 {
    auto_actions as u64 + 10 * manual_items as u64
}
