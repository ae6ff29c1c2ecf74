//! Configuration loading from `elfsym.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the config file searched for from the current directory upwards.
pub const CONFIG_FILE_NAME: &str = "elfsym.toml";

/// Output format for symbol tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width text table.
    #[default]
    Table,
    /// JSON array of records.
    Json,
}

/// On-disk config file; every key is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    format: Option<OutputFormat>,
    demangle: Option<bool>,
    warn_unranged_labels: Option<bool>,
}

/// Effective settings after merging defaults, config file and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Symbol table output format.
    pub format: OutputFormat,
    /// Render Rust symbol names demangled.
    pub demangle: bool,
    /// Log a warning for labels that fall outside `.text`.
    pub warn_unranged_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            demangle: false,
            warn_unranged_labels: true,
        }
    }
}

impl Config {
    /// Loads `explicit` if given, else the nearest `elfsym.toml`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file()?,
        };

        let Some(path) = path else {
            tracing::debug!("no {CONFIG_FILE_NAME} found, using defaults");
            return Ok(Self::default());
        };

        tracing::debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parses config file contents on top of the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            format: file.format.unwrap_or(defaults.format),
            demangle: file.demangle.unwrap_or(defaults.demangle),
            warn_unranged_labels: file
                .warn_unranged_labels
                .unwrap_or(defaults.warn_unranged_labels),
        })
    }

    /// Applies command-line flags, which take precedence over the file.
    #[must_use]
    pub fn with_flags(mut self, format: Option<OutputFormat>, demangle: bool) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self.demangle |= demangle;
        self
    }
}

/// Walks up from the current directory looking for [`CONFIG_FILE_NAME`].
fn find_config_file() -> Result<Option<PathBuf>> {
    let mut dir = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}
