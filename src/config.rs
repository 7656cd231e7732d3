//! Layered configuration.
//!
//! Priority, highest first:
//! 1. Environment variables (a `.env` file in the working directory is
//!    loaded into the environment first)
//! 2. TOML config file (`<config dir>/taskflow/config.toml`)
//! 3. Compiled defaults
//!
//! A missing config file is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Local { latency: bool },
    Remote(RemoteConfig),
}

/// How the category sidebar counters are obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CounterPolicy {
    /// Trust the counters stored on each category record.
    #[default]
    Stored,
    /// Recount from the loaded task list after every load and mutation.
    Recompute,
}

impl CounterPolicy {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stored" => Ok(CounterPolicy::Stored),
            "recompute" => Ok(CounterPolicy::Recompute),
            _ => Err(ConfigError::Invalid {
                key: "counters",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub counters: CounterPolicy,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Local { latency: true },
            counters: CounterPolicy::Stored,
            log: LogConfig::default(),
        }
    }
}

// File layout, every field optional so a file may override only a part.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    backend: Option<String>,
    counters: Option<String>,
    local: LocalSection,
    remote: RemoteSection,
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalSection {
    latency: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteSection {
    base_url: Option<String>,
    project_id: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogSection {
    level: Option<String>,
    file: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskflow").join("config.toml"))
}

impl Config {
    /// Load `.env`, the default config file and the environment.
    pub fn load() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        let file = match default_config_path() {
            Some(path) => read_file(&path)?,
            None => None,
        };
        Config::resolve(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from optional TOML text and an environment lookup.
    pub fn resolve<F>(toml_text: Option<&str>, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => ConfigFile::default(),
        };
        let defaults = Config::default();

        let backend_name = env("TASKFLOW_BACKEND")
            .or(file.backend)
            .unwrap_or_else(|| "local".to_string());

        let backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "local" => {
                let latency = match env("TASKFLOW_LATENCY") {
                    Some(value) => parse_bool("latency", &value)?,
                    None => file.local.latency.unwrap_or(true),
                };
                Backend::Local { latency }
            }
            "remote" => {
                let base_url = env("TASKFLOW_API_URL")
                    .or(file.remote.base_url)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::MissingRemote("TASKFLOW_API_URL"))?;
                let api_key = env("TASKFLOW_API_KEY")
                    .or(file.remote.api_key)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::MissingRemote("TASKFLOW_API_KEY"))?;
                let project_id = env("TASKFLOW_PROJECT_ID")
                    .or(file.remote.project_id)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::MissingRemote("TASKFLOW_PROJECT_ID"))?;
                Backend::Remote(RemoteConfig {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    project_id,
                    api_key,
                })
            }
            _ => {
                return Err(ConfigError::Invalid {
                    key: "backend",
                    value: backend_name,
                })
            }
        };

        let counters = match env("TASKFLOW_COUNTERS").or(file.counters) {
            Some(value) => CounterPolicy::parse(&value)?,
            None => defaults.counters,
        };

        let log = LogConfig {
            level: env("TASKFLOW_LOG")
                .or(file.log.level)
                .unwrap_or(defaults.log.level),
            file: env("TASKFLOW_LOG_FILE")
                .map(PathBuf::from)
                .or(file.log.file),
        };

        Ok(Config {
            backend,
            counters,
            log,
        })
    }
}

fn read_file(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), "read config file");
            Ok(Some(text))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
