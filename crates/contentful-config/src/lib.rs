//! Provider configuration for the Contentful reconciler.
//!
//! A [`ProviderConfig`] is built once at startup and passed explicitly to every
//! component that needs it; nothing is read from the environment after that.
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `CONTENTFUL__SECTION__KEY` overrides
//! 4. the canonical `CONTENTFUL_MANAGEMENT_TOKEN`, `CONTENTFUL_ORGANIZATION_ID`,
//!    `CONTENTFUL_BASE_URL` and `CONTENTFUL_ENVIRONMENT` variables

pub mod loader;
pub mod provider;
pub mod secret;

pub use loader::{load_config, load_config_with_env};
pub use provider::{HttpConfig, LoggingConfig, PollingConfig, ProviderConfig};
pub use secret::SecretString;

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ConfigError> for contentful_core::ContentfulError {
    fn from(err: ConfigError) -> Self {
        contentful_core::ContentfulError::configuration(err.to_string())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
