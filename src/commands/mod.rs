//! CLI command implementations.
//!
//! - **analyze**: detect issues and generate a plan, mutating nothing
//! - **fix**: apply the automatic portion of the plan behind a checkpoint
//! - **init**: write a default configuration file
//!
//! The shared pipeline here is the one place the stages are wired
//! together: model read, scan, classify, plan. Each stage hands an
//! explicit value to the next; nothing reads ambient process state.

pub mod analyze;
pub mod fix;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use fix::{handle_fix, FixConfig};
pub use init::init_config;

use crate::classify;
use crate::config::BuildmendConfig;
use crate::core::errors::Error;
use crate::core::{ClassifiedFinding, FixPlan, ProjectModel};
use crate::detect::{self, DetectionOutput};
use crate::io::walker;
use crate::plan;
use crate::project::{self, CommandModelProvider, LocalModelProvider, ModelProvider};
use crate::report::RunReport;
use std::path::Path;

pub(crate) struct PipelineRun {
    pub config: BuildmendConfig,
    pub model: ProjectModel,
    pub detection: DetectionOutput,
    pub classified: Vec<ClassifiedFinding>,
    pub plan: FixPlan,
}

pub(crate) enum PipelineResult {
    Ready(Box<PipelineRun>),
    /// The model could not be read; the run still gets a full report.
    Unreadable(Box<RunReport>),
}

pub(crate) fn run_pipeline(
    path: &Path,
    auto_threshold_override: Option<f64>,
    jobs: Option<usize>,
) -> anyhow::Result<PipelineResult> {
    let config = BuildmendConfig::load(path)?;
    configure_thread_pool(jobs.or(config.scan.jobs));

    let provider = select_provider(&config);
    let model = match project::read_project(provider.as_ref(), path) {
        Ok(model) => model,
        Err(err @ (Error::ProjectUnreadable { .. } | Error::Timeout { .. })) => {
            log::warn!("model read failed: {err}");
            return Ok(PipelineResult::Unreadable(Box::new(RunReport::aborted(
                path.to_path_buf(),
                err.to_string(),
            ))));
        }
        Err(err) => return Err(err.into()),
    };

    let files = walker::find_build_scripts(path, config.scan.ignore.clone())?;
    log::info!("scanning {} build file(s)", files.len());
    let detection = detect::detect(&model, &files);

    let classified = classify::classify_all(&detection.findings);
    let threshold = auto_threshold_override.unwrap_or(config.auto_threshold);
    let plan = plan::generate(&classified, threshold);

    Ok(PipelineResult::Ready(Box::new(PipelineRun {
        config,
        model,
        detection,
        classified,
        plan,
    })))
}

fn select_provider(config: &BuildmendConfig) -> Box<dyn ModelProvider> {
    match &config.provider.command {
        Some(command) => Box::new(CommandModelProvider::new(
            command.clone(),
            config.provider_timeout(),
        )),
        None => Box::new(LocalModelProvider::new()),
    }
}

fn configure_thread_pool(jobs: Option<usize>) {
    let workers = jobs.unwrap_or_else(num_cpus::get);
    // Initialization can legitimately race with an earlier call in the
    // same process; the first one wins.
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global();
}
