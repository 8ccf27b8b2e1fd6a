use buildmend::classify::classify;
use buildmend::core::{
    ClassifiedFinding, Finding, FindingCategory, FindingContext, FixClass, Severity,
    SourceLocation,
};
use buildmend::plan::generate;
use proptest::prelude::*;

/// (category, rewritable snippet) pairs the catalog can plan for.
const REWRITABLE: &[(FindingCategory, &str)] = &[
    (FindingCategory::EagerTask, "task docs {"),
    (FindingCategory::EagerTask, "tasks.create("),
    (FindingCategory::EagerTask, "tasks.getByName("),
    (
        FindingCategory::SystemPropertyAccess,
        r#"System.getProperty("env")"#,
    ),
    (FindingCategory::DeprecatedApi, "jcenter()"),
    (FindingCategory::DeprecatedApi, "testCompile '"),
];

const FILES: &[&str] = &["/p/build.gradle", "/p/app/build.gradle", "/p/settings.gradle"];

fn arbitrary_classified() -> impl Strategy<Value = ClassifiedFinding> {
    (
        0..FILES.len(),
        1usize..40,
        0..REWRITABLE.len(),
        0.0f64..=1.0,
        any::<bool>(),
    )
        .prop_map(|(file_idx, line, pair_idx, confidence, manual)| {
            let (category, matched) = REWRITABLE[pair_idx];
            let finding = Finding::new(
                category,
                SourceLocation::line(FILES[file_idx], line),
                matched,
                Severity::Medium,
            );
            ClassifiedFinding {
                finding,
                fix_class: if manual { FixClass::Manual } else { FixClass::Auto },
                confidence,
            }
        })
}

proptest! {
    /// No generated plan ever contains two actions with overlapping
    /// ranges in the same file, whatever the input findings look like.
    #[test]
    fn plans_never_contain_overlapping_actions(
        input in proptest::collection::vec(arbitrary_classified(), 0..60),
        threshold in 0.0f64..=1.0,
    ) {
        let plan = generate(&input, threshold);

        for (i, a) in plan.actions.iter().enumerate() {
            for b in &plan.actions[i + 1..] {
                prop_assert!(
                    !a.location.overlaps(&b.location),
                    "{:?} overlaps {:?}",
                    a.location,
                    b.location
                );
            }
        }
    }

    /// Every input finding is accounted for exactly once: as an action or
    /// as a manual-review item.
    #[test]
    fn every_finding_is_planned_or_listed(
        input in proptest::collection::vec(arbitrary_classified(), 0..60),
        threshold in 0.0f64..=1.0,
    ) {
        let plan = generate(&input, threshold);
        prop_assert_eq!(
            plan.actions.len() + plan.summary.manual_review.len(),
            input.len()
        );
    }

    /// Adding any single risk factor never increases confidence.
    #[test]
    fn risk_factors_are_monotonic(
        pair_idx in 0..REWRITABLE.len(),
        multiline in any::<bool>(),
        cross_module in any::<bool>(),
        ambiguous in any::<bool>(),
    ) {
        let (category, matched) = REWRITABLE[pair_idx];
        let base = Finding::new(
            category,
            SourceLocation::line("/p/build.gradle", 1),
            matched,
            Severity::Medium,
        );
        let risky = base.clone().with_context(FindingContext {
            in_multiline_string: multiline,
            cross_module,
            ambiguous_replacement: ambiguous,
        });

        prop_assert!(classify(&risky).confidence <= classify(&base).confidence);
    }
}
