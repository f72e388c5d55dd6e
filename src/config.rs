use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::ReportFormat;

/// Defaults that can be kept in a TOML file instead of passed as flags
///
/// ```toml
/// format = "tsv"
/// output = "./reports"
/// threads = 4
/// recursive = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub threads: Option<usize>,
    pub recursive: Option<bool>,
    pub allow_failures: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub threads: usize,
    pub format: ReportFormat,
    /// `None` writes to stdout
    pub output: Option<PathBuf>,
    pub allow_failures: bool,
}

/// Values given on the command line; `None`/`false` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub threads: Option<usize>,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub allow_failures: bool,
}

impl AppConfig {
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> Self {
        Self {
            inputs: cli.inputs,
            recursive: cli.recursive || file.recursive.unwrap_or(false),
            threads: cli.threads.or(file.threads).unwrap_or(0),
            format: cli.format.or(file.format).unwrap_or_default(),
            output: cli.output.or(file.output),
            allow_failures: cli.allow_failures || file.allow_failures.unwrap_or(false),
        }
    }
}
