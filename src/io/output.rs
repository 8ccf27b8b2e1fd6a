use crate::report::{RunReport, RunStatus};
use colored::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &RunReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &RunReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, report: &RunReport) -> anyhow::Result<()> {
        let status = match report.status {
            RunStatus::NoIssues | RunStatus::Committed => report.status.to_string().green().bold(),
            RunStatus::Planned => report.status.to_string().yellow().bold(),
            _ => report.status.to_string().red().bold(),
        };
        writeln!(
            self.writer,
            "{} {} (tool {}, catalog {})",
            "buildmend:".bold(),
            status,
            report.tool_version,
            report.catalog_version
        )?;
        if let Some(detail) = &report.detail {
            writeln!(self.writer, "  {detail}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, report: &RunReport) -> anyhow::Result<()> {
        let summary = &report.summary;
        if summary.findings_total == 0 {
            writeln!(self.writer, "No findings.")?;
            return Ok(());
        }

        writeln!(
            self.writer,
            "{} finding(s), {} automatic action(s) across {} file(s), ~{} min",
            summary.findings_total,
            report.planned_actions.len().max(report.applied_actions.len()),
            summary.files_touched,
            summary.estimated_minutes
        )?;
        for (category, count) in &summary.counts_by_category {
            writeln!(self.writer, "  {category}: {count}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_actions(&mut self, report: &RunReport) -> anyhow::Result<()> {
        if !report.applied_actions.is_empty() {
            writeln!(self.writer, "{}", "Applied:".bold())?;
            for action in &report.applied_actions {
                writeln!(
                    self.writer,
                    "  {}:{} {}",
                    action.location.file.display(),
                    action.location.start_line,
                    action.category
                )?;
            }
            writeln!(self.writer)?;
        }

        if let Some(preview) = &report.preview {
            writeln!(self.writer, "{}", "Proposed changes:".bold())?;
            writeln!(self.writer, "{preview}")?;
        }
        Ok(())
    }

    fn write_diagnostics(&mut self, report: &RunReport) -> anyhow::Result<()> {
        if !report.summary.manual_review.is_empty() {
            writeln!(self.writer, "{}", "Manual review:".yellow().bold())?;
            for item in &report.summary.manual_review {
                writeln!(
                    self.writer,
                    "  {}:{} {} ({:?})",
                    item.location.file.display(),
                    item.location.start_line,
                    item.category,
                    item.reason
                )?;
            }
            writeln!(self.writer)?;
        }

        for stale in &report.stale_actions {
            writeln!(
                self.writer,
                "{} {}:{} {}",
                "stale:".red(),
                stale.location.file.display(),
                stale.location.start_line,
                stale.detail
            )?;
        }
        for skipped in &report.skipped_files {
            writeln!(
                self.writer,
                "{} {} ({})",
                "skipped:".yellow(),
                skipped.path.display(),
                skipped.reason
            )?;
        }
        if let Some(rollback) = &report.rollback {
            writeln!(
                self.writer,
                "{} {} action(s) attempted, restore {}",
                "rollback:".red().bold(),
                rollback.attempted.len(),
                if rollback.restored { "succeeded" } else { "FAILED" }
            )?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &RunReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_summary(report)?;
        self.write_actions(report)?;
        self.write_diagnostics(report)?;
        Ok(())
    }
}

/// Writer for the requested format, to a file when `output` is given and
/// stdout otherwise.
pub fn create_writer(
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let destination: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(destination)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(destination)),
    })
}
