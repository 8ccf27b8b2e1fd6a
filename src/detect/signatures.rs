//! Static, versioned catalog of issue signatures.
//!
//! Each signature is a (category, pattern, optional model predicate) triple
//! plus rewrite templates. The catalog is built once at startup; detection
//! and plan generation both read from it, so a category with no entry here
//! simply never fires. `CATALOG_VERSION` is surfaced in the run report so
//! golden outputs can be tied to the catalog that produced them.

use crate::core::{FindingCategory, ProjectModel, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

pub const CATALOG_VERSION: &str = "2026.08";

/// Structural condition a signature may require of the project model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelPredicate {
    /// Rewrite target API exists only from this tool version on
    ToolVersionAtLeast { major: u64, minor: u64 },
    /// Construct was removed in this tool version; only older scripts carry it
    ToolVersionBelow { major: u64, minor: u64 },
}

impl ModelPredicate {
    pub fn holds(&self, model: &ProjectModel) -> bool {
        match *self {
            ModelPredicate::ToolVersionAtLeast { major, minor } => {
                model.tool_version.at_least(major, minor)
            }
            ModelPredicate::ToolVersionBelow { major, minor } => {
                model.tool_version.below(major, minor)
            }
        }
    }
}

/// One candidate replacement for a matched snippet.
pub struct RewriteRule {
    pattern: Regex,
    template: &'static str,
}

impl RewriteRule {
    fn new(pattern: &str, template: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("invalid rewrite pattern"),
            template,
        }
    }

    /// Apply to a matched snippet; `None` when the rule does not cover it.
    pub fn apply(&self, matched: &str) -> Option<String> {
        if !self.pattern.is_match(matched) {
            return None;
        }
        let rewritten = self.pattern.replace(matched, self.template).into_owned();
        (rewritten != matched).then_some(rewritten)
    }
}

/// A text-level issue signature.
pub struct Signature {
    pub category: FindingCategory,
    pub severity: Severity,
    pub pattern: Regex,
    pub predicate: Option<ModelPredicate>,
    pub rewrites: Vec<RewriteRule>,
}

impl Signature {
    fn new(
        category: FindingCategory,
        severity: Severity,
        pattern: &str,
        predicate: Option<ModelPredicate>,
        rewrites: Vec<RewriteRule>,
    ) -> Self {
        Self {
            category,
            severity,
            pattern: Regex::new(pattern).expect("invalid signature pattern"),
            predicate,
            rewrites,
        }
    }

    /// A signature only fires when its model predicate (if any) holds.
    pub fn applies_to(&self, model: &ProjectModel) -> bool {
        self.predicate.map(|p| p.holds(model)).unwrap_or(true)
    }

    /// All plausible replacements for a matched snippet, deduplicated in
    /// rule order. More than one candidate marks the match ambiguous.
    pub fn rewrite_candidates(&self, matched: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        for rule in &self.rewrites {
            if let Some(rewritten) = rule.apply(matched) {
                if !candidates.contains(&rewritten) {
                    candidates.push(rewritten);
                }
            }
        }
        candidates
    }
}

/// A model-level signature: a build property expected to be present.
/// Fires when the property is absent from the project model entirely; an
/// explicit value, even a disabling one, is taken as a decision and left
/// alone.
pub struct SettingSignature {
    pub category: FindingCategory,
    pub severity: Severity,
    pub property: &'static str,
    pub desired: &'static str,
    pub min_version: Option<(u64, u64)>,
}

impl SettingSignature {
    pub fn applies_to(&self, model: &ProjectModel) -> bool {
        match self.min_version {
            Some((major, minor)) => model.tool_version.at_least(major, minor),
            None => true,
        }
    }

    pub fn insertion_text(&self) -> String {
        format!("{}={}", self.property, self.desired)
    }
}

pub static CATALOG: Lazy<Vec<Signature>> = Lazy::new(build_catalog);

pub static SETTING_CATALOG: Lazy<Vec<SettingSignature>> = Lazy::new(|| {
    vec![
        SettingSignature {
            category: FindingCategory::PerformanceSettingMissing,
            severity: Severity::Low,
            property: "org.gradle.caching",
            desired: "true",
            min_version: None,
        },
        SettingSignature {
            category: FindingCategory::PerformanceSettingMissing,
            severity: Severity::Low,
            property: "org.gradle.parallel",
            desired: "true",
            min_version: None,
        },
        SettingSignature {
            category: FindingCategory::PerformanceSettingMissing,
            severity: Severity::Low,
            property: "org.gradle.configuration-cache",
            desired: "true",
            min_version: Some((8, 0)),
        },
    ]
});

fn build_catalog() -> Vec<Signature> {
    use FindingCategory::*;
    use ModelPredicate::*;

    let register_available = Some(ToolVersionAtLeast { major: 4, minor: 9 });
    let providers_available = Some(ToolVersionAtLeast { major: 6, minor: 1 });

    vec![
        // Eager task registration. `tasks.register` needs 4.9+.
        Signature::new(
            EagerTask,
            Severity::Medium,
            r"\btask\s+(\w+)\s*\{",
            register_available,
            vec![RewriteRule::new(
                r"\btask\s+(\w+)\s*\{",
                r#"tasks.register("$1") {"#,
            )],
        ),
        Signature::new(
            EagerTask,
            Severity::Medium,
            r"\btask\s+(\w+)\s*\(\s*type\s*:\s*(\w+)\s*\)\s*\{",
            register_available,
            vec![RewriteRule::new(
                r"\btask\s+(\w+)\s*\(\s*type\s*:\s*(\w+)\s*\)\s*\{",
                r#"tasks.register("$1", $2) {"#,
            )],
        ),
        Signature::new(
            EagerTask,
            Severity::Medium,
            r"\btasks\.create\(",
            register_available,
            vec![RewriteRule::new(r"\btasks\.create\(", "tasks.register(")],
        ),
        Signature::new(
            EagerTask,
            Severity::Medium,
            r"\btasks\.getByName\(",
            register_available,
            vec![RewriteRule::new(r"\btasks\.getByName\(", "tasks.named(")],
        ),
        Signature::new(
            EagerTask,
            Severity::Medium,
            r"\btasks\.(?:all|each)\s*\{",
            register_available,
            vec![RewriteRule::new(
                r"\btasks\.(?:all|each)\s*\{",
                "tasks.configureEach {",
            )],
        ),
        // Ambient JVM state read at configuration time.
        Signature::new(
            SystemPropertyAccess,
            Severity::Medium,
            r#"System\.getProperty\(\s*("[^"]*"|'[^']*')\s*\)"#,
            providers_available,
            vec![RewriteRule::new(
                r#"System\.getProperty\(\s*("[^"]*"|'[^']*')\s*\)"#,
                "providers.systemProperty($1).get()",
            )],
        ),
        Signature::new(
            SystemPropertyAccess,
            Severity::Medium,
            r#"System\.getenv\(\s*("[^"]*"|'[^']*')\s*\)"#,
            providers_available,
            vec![RewriteRule::new(
                r#"System\.getenv\(\s*("[^"]*"|'[^']*')\s*\)"#,
                "providers.environmentVariable($1).get()",
            )],
        ),
        // Project state touched inside an execution-time block. No safe
        // mechanical rewrite: the block body decides the fix.
        Signature::new(
            ProjectAccessAtExecution,
            Severity::High,
            r"\bdo(?:First|Last)\s*\{.*\bproject\.",
            None,
            vec![],
        ),
        // Removed or superseded APIs.
        Signature::new(
            DeprecatedApi,
            Severity::Medium,
            r"\bjcenter\(\)",
            None,
            vec![RewriteRule::new(r"\bjcenter\(\)", "mavenCentral()")],
        ),
        // `compile` splits into api/implementation depending on whether the
        // dependency leaks into consumers, so both rewrites stay plausible.
        Signature::new(
            DeprecatedApi,
            Severity::Medium,
            r#"\bcompile\s+['"(]"#,
            Some(ToolVersionBelow { major: 7, minor: 0 }),
            vec![
                RewriteRule::new(r"\bcompile\b", "implementation"),
                RewriteRule::new(r"\bcompile\b", "api"),
            ],
        ),
        Signature::new(
            DeprecatedApi,
            Severity::Medium,
            r#"\btestCompile\s+['"(]"#,
            Some(ToolVersionBelow { major: 7, minor: 0 }),
            vec![RewriteRule::new(r"\btestCompile\b", "testImplementation")],
        ),
        Signature::new(
            DeprecatedApi,
            Severity::Medium,
            r#"\bruntime\s+['"(]"#,
            Some(ToolVersionBelow { major: 7, minor: 0 }),
            vec![RewriteRule::new(r"\bruntime\b", "runtimeOnly")],
        ),
        Signature::new(
            DeprecatedApi,
            Severity::Medium,
            r"\barchivesBaseName\s*=",
            Some(ToolVersionAtLeast { major: 7, minor: 1 }),
            vec![RewriteRule::new(
                r"\barchivesBaseName\b",
                "base.archivesName",
            )],
        ),
        // Secrets and transport security are never auto-fixed.
        Signature::new(
            CredentialInScript,
            Severity::High,
            r#"(?i)\b(?:password|passwd|secret|api[_-]?key|token)\b\s*[:=]\s*['"][^'"]+['"]"#,
            None,
            vec![],
        ),
        Signature::new(
            CredentialInScript,
            Severity::High,
            r"(?i)^\s*systemProp\.[\w.]*(?:password|secret|token)[\w.]*\s*=",
            None,
            vec![],
        ),
        Signature::new(
            InsecureProtocol,
            Severity::High,
            r"\ballowInsecureProtocol\s*=?\s*true",
            None,
            vec![],
        ),
        Signature::new(
            InsecureProtocol,
            Severity::High,
            r#"\burl\s*[:=(]?\s*['"]http://"#,
            None,
            vec![],
        ),
    ]
}

/// All plausible replacements for a matched snippet of a category, across
/// every catalog signature of that category.
pub fn rewrite_candidates(category: FindingCategory, matched: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for signature in CATALOG.iter().filter(|s| s.category == category) {
        for rewritten in signature.rewrite_candidates(matched) {
            if !candidates.contains(&rewritten) {
                candidates.push(rewritten);
            }
        }
    }
    candidates
}

/// Insertion text for a missing-setting finding, keyed by the property
/// name the detector put in `matched_text`.
pub fn setting_insertion(property: &str) -> Option<String> {
    SETTING_CATALOG
        .iter()
        .find(|s| s.property == property)
        .map(|s| s.insertion_text())
}
