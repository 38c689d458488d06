use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::debounce::DEFAULT_DELAY;
use crate::providers::DEFAULT_API_URL;

const CONFIG_STEM: &str = "travis-build-times";

/// Configuration file structure.
///
/// Lets users keep their API endpoint, default repository and output
/// preferences between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub travis: TravisConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TravisConfig {
    /// Travis API token
    pub token: Option<String>,

    /// Travis API base URL
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Repository slug (e.g., 'owner/name')
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Only builds of this branch are charted
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Maximum number of builds to fetch
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardConfig {
    /// Quiet period before a repository edit triggers a fetch
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Base of the shareable dashboard URL
    #[serde(default = "default_location")]
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
    Html,
}

impl Default for TravisConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_api_url(),
            repository: default_repository(),
            branch: default_branch(),
            limit: default_limit(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            location: default_location(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_repository() -> String {
    "cozy/cozy-contacts".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_debounce_ms() -> u64 {
    u64::try_from(DEFAULT_DELAY.as_millis()).unwrap_or(500)
}

fn default_location() -> String {
    "http://localhost:3000/".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./travis-build-times.{toml,json,yaml,yml}
    /// 3. `<config dir>/travis-build-times/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                log::warn!("Config file not found: {}, using defaults", path.display());
                return Ok(Self::default());
            }
            return Self::load_from_path(path);
        }

        for candidate in Self::candidates() {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|ext| PathBuf::from(format!("{CONFIG_STEM}.{ext}")))
            .collect();

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(CONFIG_STEM).join("config.toml"));
        }

        candidates
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
