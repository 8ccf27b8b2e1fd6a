// Export modules for library usage
pub mod classify;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod detect;
pub mod io;
pub mod orchestrator;
pub mod plan;
pub mod project;
pub mod report;

// Re-export commonly used types
pub use crate::core::{
    errors::{Error, Result},
    ClassifiedFinding, Finding, FindingCategory, FindingContext, FixAction, FixClass, FixPlan,
    ManualReviewItem, ManualReviewReason, PlanSummary, ProjectModel, ProjectModule, Severity,
    SkippedFile, SourceLocation, StaleAction, ToolVersion,
};

pub use crate::classify::{classify, classify_all};
pub use crate::detect::{detect, detect_text, DetectionOutput};
pub use crate::plan::{generate, DEFAULT_AUTO_THRESHOLD};

pub use crate::orchestrator::{
    checkpoint::{CheckpointHandle, CheckpointProvider, GitCheckpointProvider, InMemoryCheckpointProvider},
    complexity::{assess, ComplexityAssessment, ComplexityThresholds, EngineMode, ProjectSize},
    ApplyOutcome, CancellationToken, EngineState, Orchestrator,
};

pub use crate::project::{
    read_project, CommandModelProvider, LocalModelProvider, ModelProvider, StaticModelProvider,
};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
pub use crate::report::{RunReport, RunStatus, REPORT_SCHEMA};
