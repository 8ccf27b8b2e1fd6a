use crate::io::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// Human-readable colored output
    Terminal,
    /// Machine-readable report document
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "buildmend")]
#[command(about = "Build-script issue detection and automated fix planning", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect issues and generate a fix plan without touching any file
    Analyze {
        /// Project root to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum confidence for automatic fixes
        #[arg(long = "auto-threshold")]
        auto_threshold: Option<f64>,

        /// Worker threads for the scan stage
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
    },

    /// Apply the automatic portion of the plan behind a checkpoint
    Fix {
        /// Project root to fix
        path: PathBuf,

        /// Generate the plan and report it without applying anything
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum confidence for automatic fixes
        #[arg(long = "auto-threshold")]
        auto_threshold: Option<f64>,

        /// Worker threads for the scan stage
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
    },

    /// Write a default .buildmend.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}
