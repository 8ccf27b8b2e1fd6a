use buildmend::core::{
    ClassifiedFinding, Finding, FindingCategory, FixClass, ManualReviewReason, Severity,
    SourceLocation,
};
use buildmend::plan::{generate, DEFAULT_AUTO_THRESHOLD};
use pretty_assertions::assert_eq;

fn auto_finding(file: &str, line: usize, matched: &str, category: FindingCategory) -> Finding {
    Finding::new(
        category,
        SourceLocation::line(file, line),
        matched,
        Severity::Medium,
    )
}

fn classified(finding: Finding, fix_class: FixClass, confidence: f64) -> ClassifiedFinding {
    ClassifiedFinding {
        finding,
        fix_class,
        confidence,
    }
}

#[test]
fn auto_findings_above_threshold_become_actions() {
    let input = vec![classified(
        auto_finding("/p/build.gradle", 3, "task docs {", FindingCategory::EagerTask),
        FixClass::Auto,
        0.9,
    )];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert_eq!(plan.actions.len(), 1);
    let action = &plan.actions[0];
    assert_eq!(action.original_text, "task docs {");
    assert_eq!(action.replacement_text, r#"tasks.register("docs") {"#);
    assert!(plan.summary.manual_review.is_empty());
    assert_eq!(plan.summary.files_touched, 1);
    assert_eq!(plan.summary.estimated_lines_changed, 1);
}

#[test]
fn manual_unsafe_and_low_confidence_findings_are_listed_not_planned() {
    let input = vec![
        classified(
            auto_finding(
                "/p/build.gradle",
                1,
                "doLast { project.copy {} }",
                FindingCategory::ProjectAccessAtExecution,
            ),
            FixClass::Manual,
            0.6,
        ),
        classified(
            auto_finding(
                "/p/build.gradle",
                2,
                r#"password = "hunter2""#,
                FindingCategory::CredentialInScript,
            ),
            FixClass::Unsafe,
            0.5,
        ),
        classified(
            auto_finding("/p/build.gradle", 3, "compile '", FindingCategory::DeprecatedApi),
            FixClass::Auto,
            0.6,
        ),
    ];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert!(plan.actions.is_empty());
    let reasons: Vec<ManualReviewReason> = plan
        .summary
        .manual_review
        .iter()
        .map(|item| item.reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            ManualReviewReason::ManualClass,
            ManualReviewReason::UnsafeClass,
            ManualReviewReason::BelowThreshold,
        ]
    );
}

#[test]
fn overlapping_later_action_is_demoted_to_manual() {
    // Same line, same file: the eager-task action is generated first
    // (category order), the colliding one is demoted.
    let input = vec![
        classified(
            auto_finding("/p/build.gradle", 5, "task docs {", FindingCategory::EagerTask),
            FixClass::Auto,
            0.9,
        ),
        classified(
            auto_finding(
                "/p/build.gradle",
                5,
                r#"System.getProperty("env")"#,
                FindingCategory::SystemPropertyAccess,
            ),
            FixClass::Auto,
            0.9,
        ),
    ];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(plan.actions[0].category, FindingCategory::EagerTask);
    assert_eq!(plan.summary.manual_review.len(), 1);
    assert_eq!(
        plan.summary.manual_review[0].reason,
        ManualReviewReason::OverlapDemoted
    );
    assert_eq!(
        plan.summary.manual_review[0].category,
        FindingCategory::SystemPropertyAccess
    );
}

#[test]
fn non_overlapping_actions_in_one_file_all_survive() {
    let input = vec![
        classified(
            auto_finding("/p/build.gradle", 2, "task a {", FindingCategory::EagerTask),
            FixClass::Auto,
            0.9,
        ),
        classified(
            auto_finding("/p/build.gradle", 9, "task b {", FindingCategory::EagerTask),
            FixClass::Auto,
            0.9,
        ),
    ];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);
    assert_eq!(plan.actions.len(), 2);
}

#[test]
fn missing_setting_findings_become_insertions() {
    let input = vec![classified(
        auto_finding(
            "/p/gradle.properties",
            4,
            "org.gradle.caching",
            FindingCategory::PerformanceSettingMissing,
        ),
        FixClass::Auto,
        0.95,
    )];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert_eq!(plan.actions.len(), 1);
    let action = &plan.actions[0];
    assert!(action.is_insertion());
    assert_eq!(action.replacement_text, "org.gradle.caching=true");
}

#[test]
fn findings_without_a_rewrite_fall_back_to_manual() {
    // Auto class and high confidence, but the snippet matches no rewrite
    // rule in the catalog.
    let input = vec![classified(
        auto_finding(
            "/p/build.gradle",
            1,
            "somethingUnrecognized()",
            FindingCategory::DeprecatedApi,
        ),
        FixClass::Auto,
        0.9,
    )];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert!(plan.actions.is_empty());
    assert_eq!(
        plan.summary.manual_review[0].reason,
        ManualReviewReason::NoRewriteAvailable
    );
}

#[test]
fn summary_counts_every_finding_by_category() {
    let input = vec![
        classified(
            auto_finding("/p/a.gradle", 1, "task a {", FindingCategory::EagerTask),
            FixClass::Auto,
            0.9,
        ),
        classified(
            auto_finding("/p/b.gradle", 1, "task b {", FindingCategory::EagerTask),
            FixClass::Auto,
            0.9,
        ),
        classified(
            auto_finding(
                "/p/b.gradle",
                2,
                r#"password = "x""#,
                FindingCategory::CredentialInScript,
            ),
            FixClass::Unsafe,
            0.5,
        ),
    ];

    let plan = generate(&input, DEFAULT_AUTO_THRESHOLD);

    assert_eq!(plan.summary.findings_total, 3);
    assert_eq!(
        plan.summary.counts_by_category[&FindingCategory::EagerTask],
        2
    );
    assert_eq!(
        plan.summary.counts_by_category[&FindingCategory::CredentialInScript],
        1
    );
    assert_eq!(plan.summary.files_touched, 2);
    // One minute per action, ten per manual item.
    assert_eq!(plan.summary.estimated_minutes, 2 + 10);
}
