use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let default_config = r#"# Buildmend Configuration

# Minimum confidence for a finding to be fixed automatically (0.0-1.0)
auto_threshold = 0.75

[complexity]
# Module-count boundaries for project sizing
small_max_modules = 5
medium_max_modules = 20

[scan]
# Worker threads for the scan stage (defaults to CPU count)
# jobs = 4
ignore = [
    "**/build/**",
    "**/.gradle/**",
]

[provider]
# External model-provider command; the built-in descriptor reader is used
# when unset. Invoked with the project path, expected to print the model
# as JSON on stdout.
# command = "gradle-model-dump"
timeout_secs = 60
"#;

    io::write_file(&config_path, default_config)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}
