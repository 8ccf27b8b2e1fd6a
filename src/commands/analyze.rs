use super::{run_pipeline, PipelineResult};
use crate::io::output::{create_writer, OutputFormat};
use crate::plan::preview;
use crate::report::{RunReport, RunStatus};
use std::path::PathBuf;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub auto_threshold: Option<f64>,
    pub jobs: Option<usize>,
}

pub fn handle_analyze(config: AnalyzeConfig) -> anyhow::Result<i32> {
    let report = match run_pipeline(&config.path, config.auto_threshold, config.jobs)? {
        PipelineResult::Unreadable(report) => *report,
        PipelineResult::Ready(run) => {
            let status = if run.detection.findings.is_empty() {
                RunStatus::NoIssues
            } else {
                RunStatus::Planned
            };

            let mut report = RunReport::new(
                config.path.clone(),
                run.model.tool_version.to_string(),
                status,
            )
            .with_plan(&run.plan)
            .with_skipped(run.detection.skipped.clone());

            if status == RunStatus::Planned {
                report.preview = Some(preview::render(&run.plan, &config.path));
            }
            report
        }
    };

    let mut writer = create_writer(config.format, config.output)?;
    writer.write_report(&report)?;
    Ok(report.exit_code())
}
