//! `.buildmend.toml` loading.
//!
//! Configuration is looked up from the project root upward, then in the
//! user's home directory, then falls back to defaults. A present-but-broken
//! config file is a hard error; a missing one is not.

use crate::core::errors::{Error, Result};
use crate::orchestrator::complexity::ComplexityThresholds;
use crate::plan::DEFAULT_AUTO_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".buildmend.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildmendConfig {
    /// Minimum confidence for an `Auto` finding to become a plan action
    #[serde(default = "default_auto_threshold")]
    pub auto_threshold: f64,

    #[serde(default)]
    pub complexity: ComplexityConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityConfig {
    #[serde(default = "default_small_max_modules")]
    pub small_max_modules: usize,
    #[serde(default = "default_medium_max_modules")]
    pub medium_max_modules: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    /// Worker count for the parallel scan; defaults to the CPU count
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Glob patterns excluded from the build-script walk
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// External model-provider command; the built-in descriptor reader is
    /// used when unset
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BuildmendConfig {
    fn default() -> Self {
        Self {
            auto_threshold: default_auto_threshold(),
            complexity: ComplexityConfig::default(),
            scan: ScanConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            small_max_modules: default_small_max_modules(),
            medium_max_modules: default_medium_max_modules(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_auto_threshold() -> f64 {
    DEFAULT_AUTO_THRESHOLD
}

fn default_small_max_modules() -> usize {
    ComplexityThresholds::default().small_max_modules
}

fn default_medium_max_modules() -> usize {
    ComplexityThresholds::default().medium_max_modules
}

fn default_timeout_secs() -> u64 {
    60
}

impl BuildmendConfig {
    /// Locate and load configuration for a project. Search order: the
    /// project root and its ancestors, then the home directory.
    pub fn load(project_root: &Path) -> Result<Self> {
        match find_config_file(project_root) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.auto_threshold) {
            return Err(Error::configuration(
                "auto_threshold must be between 0.0 and 1.0",
            ));
        }
        if self.complexity.small_max_modules >= self.complexity.medium_max_modules {
            return Err(Error::configuration(
                "complexity.small_max_modules must be below medium_max_modules",
            ));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> ComplexityThresholds {
        ComplexityThresholds {
            small_max_modules: self.complexity.small_max_modules,
            medium_max_modules: self.complexity.medium_max_modules,
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

fn find_config_file(project_root: &Path) -> Option<PathBuf> {
    let mut current = Some(project_root);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .filter(|candidate| candidate.is_file())
}
