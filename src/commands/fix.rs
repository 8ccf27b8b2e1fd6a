use super::{run_pipeline, PipelineResult};
use crate::io::output::{create_writer, OutputFormat};
use crate::orchestrator::checkpoint::GitCheckpointProvider;
use crate::orchestrator::Orchestrator;
use crate::plan::preview;
use crate::report::{RunReport, RunStatus};
use std::path::PathBuf;

pub struct FixConfig {
    pub path: PathBuf,
    pub dry_run: bool,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub auto_threshold: Option<f64>,
    pub jobs: Option<usize>,
}

pub fn handle_fix(config: FixConfig) -> anyhow::Result<i32> {
    let report = match run_pipeline(&config.path, config.auto_threshold, config.jobs)? {
        PipelineResult::Unreadable(report) => *report,
        PipelineResult::Ready(run) => {
            let tool_version = run.model.tool_version.to_string();

            if run.detection.findings.is_empty() {
                RunReport::new(config.path.clone(), tool_version, RunStatus::NoIssues)
                    .with_skipped(run.detection.skipped.clone())
            } else if config.dry_run {
                let mut report =
                    RunReport::new(config.path.clone(), tool_version, RunStatus::Planned)
                        .with_plan(&run.plan)
                        .with_skipped(run.detection.skipped.clone());
                report.preview = Some(preview::render(&run.plan, &config.path));
                report
            } else {
                let mut checkpoint = GitCheckpointProvider::new(
                    &config.path,
                    run.config.provider_timeout(),
                );
                let outcome = Orchestrator::new(&run.model, &mut checkpoint)
                    .with_thresholds(run.config.thresholds())
                    .execute(&run.plan, &run.classified);

                RunReport::new(config.path.clone(), tool_version, RunStatus::Planned)
                    .with_plan(&run.plan)
                    .with_skipped(run.detection.skipped.clone())
                    .with_outcome(outcome)
            }
        }
    };

    let mut writer = create_writer(config.format, config.output)?;
    writer.write_report(&report)?;
    Ok(report.exit_code())
}
