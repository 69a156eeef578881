use std::time::Duration;

use contentful_core::Backoff;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ConfigError, SecretString};

pub const DEFAULT_BASE_URL: &str = "https://api.contentful.com";
pub const DEFAULT_ENVIRONMENT: &str = "master";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Content Management API personal access token
    #[serde(default)]
    pub cma_token: SecretString,
    /// Organization owning spaces, teams, taxonomy and app definitions
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment used when a resource does not name one
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub http: HttpConfig,
    /// Polling after an asset file was submitted for processing
    #[serde(default, deserialize_with = "asset_processing_over_defaults")]
    pub asset_processing: PollingConfig,
    /// Polling after an environment was created until it is ready
    #[serde(
        default = "PollingConfig::environment_ready",
        deserialize_with = "environment_ready_over_defaults"
    )]
    pub environment_ready: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            cma_token: SecretString::default(),
            organization_id: None,
            base_url: default_base_url(),
            environment: default_environment(),
            http: HttpConfig::default(),
            asset_processing: PollingConfig::default(),
            environment_ready: PollingConfig::environment_ready(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ProviderConfig {
    pub fn new(cma_token: impl Into<String>) -> Self {
        Self {
            cma_token: SecretString::new(cma_token),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cma_token.is_empty() {
            return Err(ConfigError::validation(
                "cma_token is required (set CONTENTFUL_MANAGEMENT_TOKEN)",
            ));
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::validation(format!("base_url is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation("base_url must use http or https"));
        }
        if self.environment.trim().is_empty() {
            return Err(ConfigError::validation("environment must not be empty"));
        }
        if let Some(org) = &self.organization_id
            && org.trim().is_empty()
        {
            return Err(ConfigError::validation(
                "organization_id must not be empty when set",
            ));
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::validation("http.timeout_ms must be > 0"));
        }
        self.asset_processing.validate("asset_processing")?;
        self.environment_ready.validate("environment_ready")?;

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries for connection failures and rate limiting; never for conflicts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    250
}

fn default_user_agent() -> String {
    format!("contentful-provider/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Backoff {
        Backoff {
            initial: Duration::from_millis(self.retry_base_ms),
            max_interval: Duration::from_secs(10),
            multiplier: 2,
            max_attempts: self.max_retries + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub multiplier: u32,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_interval_ms: 8_000,
            multiplier: 2,
            max_attempts: 10,
        }
    }
}

impl PollingConfig {
    fn environment_ready() -> Self {
        Self {
            initial_interval_ms: 1_000,
            max_interval_ms: 10_000,
            multiplier: 2,
            max_attempts: 20,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            initial: Duration::from_millis(self.initial_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::validation(format!(
                "{section}.max_attempts must be > 0"
            )));
        }
        if self.multiplier == 0 {
            return Err(ConfigError::validation(format!(
                "{section}.multiplier must be > 0"
            )));
        }
        if self.initial_interval_ms > self.max_interval_ms {
            return Err(ConfigError::validation(format!(
                "{section}.initial_interval_ms must be <= {section}.max_interval_ms"
            )));
        }
        Ok(())
    }
}

/// A polling section as written; each missing field keeps the section default.
#[derive(Debug, Default, Deserialize)]
struct PollingOverrides {
    initial_interval_ms: Option<u64>,
    max_interval_ms: Option<u64>,
    multiplier: Option<u32>,
    max_attempts: Option<u32>,
}

impl PollingOverrides {
    fn over(self, base: PollingConfig) -> PollingConfig {
        PollingConfig {
            initial_interval_ms: self.initial_interval_ms.unwrap_or(base.initial_interval_ms),
            max_interval_ms: self.max_interval_ms.unwrap_or(base.max_interval_ms),
            multiplier: self.multiplier.unwrap_or(base.multiplier),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
        }
    }
}

fn asset_processing_over_defaults<'de, D>(deserializer: D) -> Result<PollingConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PollingOverrides::deserialize(deserializer)?.over(PollingConfig::default()))
}

fn environment_ready_over_defaults<'de, D>(deserializer: D) -> Result<PollingConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PollingOverrides::deserialize(deserializer)?.over(PollingConfig::environment_ready()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
