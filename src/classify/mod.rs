//! Confidence classification of findings.
//!
//! Classification is a pure function of the finding and the static
//! per-category tables below: no I/O, no randomness. Risk context recorded
//! at detection time only ever lowers confidence, and credential or
//! transport categories stay `Unsafe` whatever the score says.

use crate::core::{ClassifiedFinding, Finding, FindingCategory, FixClass};

/// Fixed penalties for context risk factors. Each applies at most once.
const MULTILINE_STRING_PENALTY: f64 = 0.3;
const CROSS_MODULE_PENALTY: f64 = 0.1;
const AMBIGUOUS_REPLACEMENT_PENALTY: f64 = 0.2;

/// Base confidence and fix class per category.
///
/// Exhaustive on purpose: adding a category without deciding how it
/// classifies is a compile error.
fn category_profile(category: FindingCategory) -> (f64, FixClass) {
    match category {
        FindingCategory::EagerTask => (0.9, FixClass::Auto),
        FindingCategory::SystemPropertyAccess => (0.9, FixClass::Auto),
        FindingCategory::DeprecatedApi => (0.8, FixClass::Auto),
        FindingCategory::PerformanceSettingMissing => (0.95, FixClass::Auto),
        FindingCategory::ProjectAccessAtExecution => (0.6, FixClass::Manual),
        FindingCategory::CredentialInScript => (0.5, FixClass::Unsafe),
        FindingCategory::InsecureProtocol => (0.5, FixClass::Unsafe),
    }
}

pub fn classify(finding: &Finding) -> ClassifiedFinding {
    let (base, fix_class) = category_profile(finding.category);

    let mut confidence = base;
    if finding.context.in_multiline_string {
        confidence -= MULTILINE_STRING_PENALTY;
    }
    if finding.context.cross_module {
        confidence -= CROSS_MODULE_PENALTY;
    }
    if finding.context.ambiguous_replacement {
        confidence -= AMBIGUOUS_REPLACEMENT_PENALTY;
    }

    ClassifiedFinding {
        finding: finding.clone(),
        fix_class,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

pub fn classify_all(findings: &[Finding]) -> Vec<ClassifiedFinding> {
    findings.iter().map(classify).collect()
}
