//! Application configuration.
//!
//! Layered loading: an optional TOML file, then environment variables,
//! then programmatic overrides (highest precedence). The webhook target is
//! required; everything else falls back to defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub webhook: WebhookConfig,
    pub logging: LoggingConfig,
}

/// Target n8n webhook, split into base URL and workflow path the way the
/// deployment variables provide them.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub base_url: String,
    pub webhook_path: String,
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// Full webhook URL, joining base and path with exactly one slash.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.webhook_path.trim_start_matches('/')
        )
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                name: "log format".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Programmatic overrides, mainly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub webhook_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("required environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid {name}: `{value}`")]
    InvalidValue { name: String, value: String },
}

/// Partial configuration as read from a TOML file; every field optional so
/// later layers can fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    webhook: Option<WebhookPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    base_url: Option<String>,
    webhook_path: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let patch = match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => read_patch(&path)?,
            None => ConfigPatch::default(),
        };
        let webhook_patch = patch.webhook.unwrap_or_default();
        let logging_patch = patch.logging.unwrap_or_default();

        let mut base_url = webhook_patch.base_url;
        let mut webhook_path = webhook_patch.webhook_path;
        let mut timeout_secs = webhook_patch.timeout_secs;
        let mut log_level = logging_patch.level;
        let mut log_format = logging_patch.format;

        if let Some(value) = read_env("N8N_BASE_URL") {
            base_url = Some(value);
        }
        if let Some(value) = read_env("N8N_WEBHOOK_PATH") {
            webhook_path = Some(value);
        }
        if let Some(value) = read_env("N8N_TIMEOUT_SECS") {
            timeout_secs = Some(parse_u64("N8N_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = read_env("ORDENA_LOG_LEVEL") {
            log_level = Some(value);
        }
        if let Some(value) = read_env("ORDENA_LOG_FORMAT") {
            log_format = Some(value.parse()?);
        }

        let overrides = options.overrides;
        if let Some(value) = overrides.base_url {
            base_url = Some(value);
        }
        if let Some(value) = overrides.webhook_path {
            webhook_path = Some(value);
        }
        if let Some(value) = overrides.timeout_secs {
            timeout_secs = Some(value);
        }
        if let Some(value) = overrides.log_level {
            log_level = Some(value);
        }
        if let Some(value) = overrides.log_format {
            log_format = Some(value);
        }

        let config = Self {
            webhook: WebhookConfig {
                base_url: base_url.ok_or(ConfigError::MissingVar("N8N_BASE_URL"))?,
                webhook_path: webhook_path.ok_or(ConfigError::MissingVar("N8N_WEBHOOK_PATH"))?,
                timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            logging: LoggingConfig {
                level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                format: log_format.unwrap_or(LogFormat::Compact),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.webhook.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                name: "webhook base URL".to_string(),
                value: self.webhook.base_url.clone(),
            });
        }
        if self.webhook.webhook_path.trim().is_empty() {
            return Err(ConfigError::MissingVar("N8N_WEBHOOK_PATH"));
        }
        if self.webhook.timeout_secs == 0 || self.webhook.timeout_secs > 300 {
            return Err(ConfigError::InvalidValue {
                name: "webhook timeout".to_string(),
                value: self.webhook.timeout_secs.to_string(),
            });
        }
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Some(path) = read_env("ORDENA_CONFIG").map(PathBuf::from) {
        return path.exists().then_some(path);
    }
    let default = PathBuf::from("ordena.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(name: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}
