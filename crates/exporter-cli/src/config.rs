//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use exporter_articlemeta::Connection;
use exporter_core::{HttpSettings, RetryPolicy};
use serde::Deserialize;

/// Overrides `export.max_retries`
pub const RETRIES_ENV: &str = "EXPORT_RUN_RETRIES";

/// Global configuration for exporter
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub articlemeta: ArticleMetaConfig,
    pub http: HttpConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ArticleMetaConfig {
    pub connection: Connection,
    /// Endpoint override; may reference an environment variable as `${VAR}`
    #[serde(deserialize_with = "deserialize_env_var")]
    pub domain: Option<String>,
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout: u64,
    pub request_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 30,
            request_timeout: 60,
        }
    }
}

impl HttpConfig {
    pub fn settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub workers: usize,
    pub max_retries: u32,
    pub retry_base_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_retries: 3,
            retry_base_ms: 2000,
        }
    }
}

impl ExportConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_ms),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration, then apply environment overrides
    ///
    /// Search order:
    /// 1. `explicit` (from `--config`), which must exist
    /// 2. ./exporter.toml (current directory)
    /// 3. ~/.config/exporter/config.toml
    ///
    /// If no config file found, starts from defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::discover()?,
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn discover() -> Result<Self> {
        let local_config = PathBuf::from("exporter.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "exporter") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let Some(raw) = lookup(RETRIES_ENV) else {
            return;
        };
        match raw.trim().parse() {
            Ok(n) => self.export.max_retries = n,
            Err(_) => log::warn!("Ignoring {RETRIES_ENV}={raw:?}: not a non-negative integer"),
        }
    }
}
