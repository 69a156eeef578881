use std::sync::Arc;

use contentful_client::{CmaClient, Transport};
use contentful_config::ProviderConfig;
use contentful_core::{ContentfulError, Result};

/// Everything a reconciliation needs, passed explicitly to every call.
#[derive(Clone)]
pub struct ProviderContext {
    transport: Arc<dyn Transport>,
    config: Arc<ProviderConfig>,
}

impl ProviderContext {
    pub fn new(transport: Arc<dyn Transport>, config: Arc<ProviderConfig>) -> Self {
        Self { transport, config }
    }

    /// Validates `config` and builds the reqwest transport from it.
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = CmaClient::new(&config)?;
        Ok(Self::new(Arc::new(client), Arc::new(config)))
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Organization id for organization-scoped resources.
    pub fn organization_id(&self) -> Result<&str> {
        self.config
            .organization_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ContentfulError::configuration(
                    "organization_id is required for this resource (set CONTENTFUL_ORGANIZATION_ID)",
                )
            })
    }

    /// `environment_id` when set, otherwise the configured default environment.
    pub fn environment_or(&self, environment_id: &str) -> String {
        if environment_id.trim().is_empty() {
            self.config.environment.clone()
        } else {
            environment_id.to_string()
        }
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
