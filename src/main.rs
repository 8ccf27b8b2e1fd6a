use anyhow::Result;
use buildmend::cli::{Cli, Commands};
use buildmend::commands::{self, AnalyzeConfig, FixConfig};
use clap::Parser;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(4);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            auto_threshold,
            jobs,
        } => commands::handle_analyze(AnalyzeConfig {
            path,
            format: format.into(),
            output,
            auto_threshold,
            jobs,
        }),
        Commands::Fix {
            path,
            dry_run,
            format,
            output,
            auto_threshold,
            jobs,
        } => commands::handle_fix(FixConfig {
            path,
            dry_run,
            format: format.into(),
            output,
            auto_threshold,
            jobs,
        }),
        Commands::Init { force } => {
            commands::init_config(force)?;
            Ok(0)
        }
    }
}
