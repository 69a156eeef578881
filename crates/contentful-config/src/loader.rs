use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;

use crate::{ConfigError, ProviderConfig};

/// Default file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "contentful.toml";

const ENV_PREFIX: &str = "CONTENTFUL";

/// Canonical variables and the config keys they override.
const CANONICAL_VARS: [(&str, &str); 4] = [
    ("CONTENTFUL_MANAGEMENT_TOKEN", "cma_token"),
    ("CONTENTFUL_ORGANIZATION_ID", "organization_id"),
    ("CONTENTFUL_BASE_URL", "base_url"),
    ("CONTENTFUL_ENVIRONMENT", "environment"),
];

/// Loads configuration from `path` (or `contentful.toml`) and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<ProviderConfig, ConfigError> {
    load_config_with_env(path, std::env::vars().collect())
}

/// Same as [`load_config`] with an explicit variable map instead of the process environment.
pub fn load_config_with_env(
    path: Option<&Path>,
    vars: HashMap<String, String>,
) -> Result<ProviderConfig, ConfigError> {
    let mut builder = Config::builder();

    let file = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if file.exists() {
        debug!(path = %file.display(), "loading provider config file");
        builder = builder.add_source(File::from(file));
    } else if let Some(p) = path {
        return Err(ConfigError::parse(format!(
            "config file {} does not exist",
            p.display()
        )));
    }

    // Nested overrides, e.g. CONTENTFUL__HTTP__TIMEOUT_MS=5000
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars.clone())),
    );

    for (var, key) in CANONICAL_VARS {
        let value = vars.get(var).filter(|v| !v.trim().is_empty()).cloned();
        builder = builder.set_override_option(key, value)?;
    }

    let cfg = builder.build()?;
    let merged: ProviderConfig = cfg
        .try_deserialize()
        .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
    merged.validate()?;
    Ok(merged)
}
