//! Issue detection over build-script text and the project model.
//!
//! Scanning is signature-by-signature per file. Independent files are
//! scanned in parallel; results are merged and re-sorted into file-then-line
//! order so concurrency can never change output ordering. Findings are
//! emitted per match with no dedup at this stage; overlap resolution belongs
//! to plan generation.

pub mod lexical;
pub mod signatures;

use crate::core::{
    Finding, FindingCategory, FindingContext, ProjectModel, SkippedFile, SourceLocation,
};
use indicatif::{ParallelProgressIterator, ProgressBar};
use lexical::{LexicalMap, TextKind};
use rayon::prelude::*;
use signatures::{SETTING_CATALOG, CATALOG};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of one detection pass: ordered findings plus the files that
/// could not be scanned. Skipped files are diagnostics for the run
/// summary, never errors.
#[derive(Clone, Debug, Default)]
pub struct DetectionOutput {
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedFile>,
}

/// Full detection pass: text signatures over every file plus model-level
/// setting checks.
pub fn detect(model: &ProjectModel, files: &[PathBuf]) -> DetectionOutput {
    let mut output = detect_text(model, files, None);
    output.findings.extend(detect_settings(model));
    sort_findings(&mut output.findings);
    output
}

/// Text-signature detection, optionally restricted to a category set.
/// The verification stage uses the restricted form to re-scan mutated
/// files for just-fixed categories.
pub fn detect_text(
    model: &ProjectModel,
    files: &[PathBuf],
    restrict: Option<&BTreeSet<FindingCategory>>,
) -> DetectionOutput {
    let results: Vec<(Vec<Finding>, Option<SkippedFile>)> = files
        .par_iter()
        .progress_with(scan_progress(files.len()))
        .map(|file| scan_file(model, file, restrict))
        .collect();

    let mut output = DetectionOutput::default();
    for (findings, skipped) in results {
        output.findings.extend(findings);
        output.skipped.extend(skipped);
    }

    sort_findings(&mut output.findings);
    output.skipped.sort_by(|a, b| a.path.cmp(&b.path));
    output
}

/// Scan a single file against every applicable signature. Malformed input
/// never fails the pass: unreadable or non-UTF-8 files come back as a
/// `SkippedFile`.
fn scan_file(
    model: &ProjectModel,
    file: &Path,
    restrict: Option<&BTreeSet<FindingCategory>>,
) -> (Vec<Finding>, Option<SkippedFile>) {
    let bytes = match fs::read(file) {
        Ok(bytes) => bytes,
        Err(err) => {
            return (
                vec![],
                Some(SkippedFile {
                    path: file.to_path_buf(),
                    reason: err.to_string(),
                }),
            )
        }
    };

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => {
            return (
                vec![],
                Some(SkippedFile {
                    path: file.to_path_buf(),
                    reason: "not valid UTF-8".to_string(),
                }),
            )
        }
    };

    (scan_content(model, file, &content, restrict), None)
}

fn scan_content(
    model: &ProjectModel,
    file: &Path,
    content: &str,
    restrict: Option<&BTreeSet<FindingCategory>>,
) -> Vec<Finding> {
    let map = LexicalMap::build(content);
    let cross_module = !model.in_root_module(file);
    let mut findings = Vec::new();

    let signatures: Vec<_> = CATALOG
        .iter()
        .filter(|s| restrict.map(|set| set.contains(&s.category)).unwrap_or(true))
        .filter(|s| s.applies_to(model))
        .collect();

    for (line_idx, line) in content.lines().enumerate() {
        let line_no = line_idx + 1;
        for signature in &signatures {
            for m in signature.pattern.find_iter(line) {
                // Position-of-match decides suppression: a match starting
                // inside a comment or single-line literal is documentation,
                // not build logic.
                let kind = map.kind_at(line_no, m.start());
                if matches!(kind, TextKind::Comment | TextKind::StringLiteral) {
                    continue;
                }

                let context = FindingContext {
                    in_multiline_string: kind == TextKind::MultilineString,
                    cross_module,
                    ambiguous_replacement: signature.rewrite_candidates(m.as_str()).len() > 1,
                };

                findings.push(
                    Finding::new(
                        signature.category,
                        SourceLocation::line(file, line_no),
                        m.as_str(),
                        signature.severity,
                    )
                    .with_context(context),
                );
            }
        }
    }

    findings
}

/// Model-level checks: expected build properties that are absent from the
/// project model. Findings anchor just past the end of the properties
/// file so the generated fix is an append.
fn detect_settings(model: &ProjectModel) -> Vec<Finding> {
    let properties_file = model.root.join("gradle.properties");
    let anchor_line = fs::read_to_string(&properties_file)
        .map(|content| content.lines().count() + 1)
        .unwrap_or(1);

    SETTING_CATALOG
        .iter()
        .filter(|s| s.applies_to(model))
        .filter(|s| model.property(s.property).is_none())
        .map(|s| {
            Finding::new(
                s.category,
                SourceLocation::line(&properties_file, anchor_line),
                s.property,
                s.severity,
            )
        })
        .collect()
}

/// Deterministic file-then-line order, with category and matched text as
/// tiebreakers so equal locations still sort stably.
fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (
            &a.location.file,
            a.location.start_line,
            a.location.end_line,
            a.category,
            &a.matched_text,
        )
            .cmp(&(
                &b.location.file,
                b.location.start_line,
                b.location.end_line,
                b.category,
                &b.matched_text,
            ))
    });
}

fn scan_progress(files: usize) -> ProgressBar {
    if log::log_enabled!(log::Level::Info) {
        ProgressBar::new(files as u64)
    } else {
        ProgressBar::hidden()
    }
}
