//! Process settings resolved once at start-up.
//!
//! Values come from the environment, optionally seeded from a `.env` file
//! (`FINTOOLS_ENV_FILE`, else `./.env`). Nothing is re-read after start-up.

use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::executor::{ExecutorConfig, DEFAULT_MAX_CONCURRENCY};

pub const DEFAULT_APP_NAME: &str = "Financial Market Tools";
pub const DEFAULT_COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
pub const DEFAULT_MASSIVE_BASE_URL: &str = "https://api.massive.com";
const DEFAULT_FOREX_TIMEOUT_SECONDS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Immutable configuration of one upstream provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_concurrency: usize,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_concurrency: self.max_concurrency,
            timeout: self.timeout,
        }
    }
}

impl Debug for ProviderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("max_concurrency", &self.max_concurrency)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Full process settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub app_name: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub coinmarketcap_api_key: String,
    pub coinmarketcap_base_url: String,
    pub massive_api_key: String,
    pub massive_base_url: String,
    pub forex_max_concurrency: usize,
    pub forex_timeout: Duration,
}

impl Settings {
    /// Loads the env file (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_file()?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let log_format = match optional("LOG_FORMAT").as_deref().map(str::trim) {
            None => LogFormat::Text,
            Some(value) if value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: value.to_owned(),
                })
            }
        };

        let forex_max_concurrency = parse_positive(
            "FOREX_MAX_CONCURRENCY",
            optional("FOREX_MAX_CONCURRENCY"),
            DEFAULT_MAX_CONCURRENCY as u64,
        )? as usize;
        let forex_timeout_seconds = parse_positive(
            "FOREX_TIMEOUT_SECONDS",
            optional("FOREX_TIMEOUT_SECONDS"),
            DEFAULT_FOREX_TIMEOUT_SECONDS,
        )?;

        Ok(Self {
            app_name: optional("APP_NAME").unwrap_or_else(|| String::from(DEFAULT_APP_NAME)),
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| String::from("info")),
            log_format,
            coinmarketcap_api_key: required("COINMARKETCAP_API_KEY")?,
            coinmarketcap_base_url: optional("COINMARKETCAP_BASE_URL")
                .unwrap_or_else(|| String::from(DEFAULT_COINMARKETCAP_BASE_URL)),
            massive_api_key: required("MASSIVE_API_KEY")?,
            massive_base_url: optional("MASSIVE_BASE_URL")
                .unwrap_or_else(|| String::from(DEFAULT_MASSIVE_BASE_URL)),
            forex_max_concurrency,
            forex_timeout: Duration::from_secs(forex_timeout_seconds),
        })
    }

    pub fn forex_provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.massive_api_key.clone(),
            base_url: trim_base_url(&self.massive_base_url),
            max_concurrency: self.forex_max_concurrency,
            timeout: self.forex_timeout,
        }
    }

    /// CoinMarketCap calls are not pooled; the cap only documents intent.
    pub fn crypto_provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.coinmarketcap_api_key.clone(),
            base_url: trim_base_url(&self.coinmarketcap_base_url),
            max_concurrency: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("coinmarketcap_api_key", &"[REDACTED]")
            .field("coinmarketcap_base_url", &self.coinmarketcap_base_url)
            .field("massive_api_key", &"[REDACTED]")
            .field("massive_base_url", &self.massive_base_url)
            .field("forex_max_concurrency", &self.forex_max_concurrency)
            .field("forex_timeout", &self.forex_timeout)
            .finish()
    }
}

fn load_env_file() -> Result<(), ConfigError> {
    match std::env::var("FINTOOLS_ENV_FILE") {
        Ok(path) => load_env_file_from(Path::new(&path)),
        Err(_) => {
            if Path::new(".env").exists() {
                load_env_file_from(Path::new(".env"))
            } else {
                tracing::debug!("no .env file found; using process environment only");
                Ok(())
            }
        }
    }
}

/// Loads `path` into the process environment without overriding variables
/// that are already set.
pub fn load_env_file_from(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|error| ConfigError::EnvFile {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

fn parse_positive(
    var: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Invalid { var, value: raw }),
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
