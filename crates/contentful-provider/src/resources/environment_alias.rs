use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ContentfulError, ImportFormat, ImportId, Link, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, space_path};
use crate::context::ProviderContext;
use crate::resource::{Resource, require, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAliasState {
    pub space_id: String,
    /// Caller-chosen alias id, e.g. `master`.
    pub id: String,
    #[serde(default)]
    pub version: Option<u64>,
    /// Environment the alias points to.
    pub environment_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AliasBody {
    environment: Link,
}

#[derive(Debug, Deserialize)]
struct AliasWire {
    environment: Link,
    sys: Sys,
}

impl EnvironmentAliasState {
    fn draft(&self) -> Result<serde_json::Value> {
        let target = require("environment_id", &self.environment_id)?;
        Ok(serde_json::to_value(AliasBody {
            environment: Link::new("Environment", target),
        })?)
    }

    fn import(wire: AliasWire, prior: &EnvironmentAliasState) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            id: wire.sys.id,
            version: Some(wire.sys.version),
            environment_id: wire.environment.sys.id,
        }
    }

    fn path(&self) -> Result<String> {
        Ok(format!(
            "{}/environment_aliases/{}",
            space_path(require("space_id", &self.space_id)?),
            require("id", &self.id)?
        ))
    }
}

pub struct EnvironmentAliasResource;

#[async_trait]
impl Resource for EnvironmentAliasResource {
    type State = EnvironmentAliasState;

    const TYPE_NAME: &'static str = "contentful_environment_alias";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["aliasId", "spaceId"]);

    fn id(state: &EnvironmentAliasState) -> Option<&str> {
        Some(state.id.as_str())
    }

    fn version(state: &EnvironmentAliasState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> EnvironmentAliasState {
        EnvironmentAliasState {
            space_id: id.get("spaceId").to_string(),
            id: id.get("aliasId").to_string(),
            version: None,
            environment_id: String::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &EnvironmentAliasState,
    ) -> Result<EnvironmentAliasState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(plan.path()?).with_body(plan.draft()?);
        let wire: AliasWire = api.send(request, &[StatusCode::CREATED], &plan.id).await?;
        Ok(EnvironmentAliasState::import(wire, plan))
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &EnvironmentAliasState,
    ) -> Result<Option<EnvironmentAliasState>> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<AliasWire> = api.fetch(&current.path()?, &current.id).await?;
        Ok(wire.map(|w| EnvironmentAliasState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &EnvironmentAliasState,
        current: &EnvironmentAliasState,
    ) -> Result<EnvironmentAliasState> {
        if plan.id != current.id {
            return Err(ContentfulError::invalid_value(
                "id",
                "an alias cannot be renamed; delete and recreate it",
            ));
        }
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(current.path()?)
            .with_version(require_version(current.version)?)
            .with_body(plan.draft()?);
        let wire: AliasWire = api.send(request, &[StatusCode::OK], &current.id).await?;
        Ok(EnvironmentAliasState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &EnvironmentAliasState) -> Result<()> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        api.remove(ApiRequest::delete(current.path()?), &current.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_links_target_environment() {
        let state = EnvironmentAliasState {
            space_id: "sp".into(),
            id: "master".into(),
            version: None,
            environment_id: "release-2".into(),
        };
        assert_eq!(
            state.draft().unwrap(),
            json!({"environment": {"sys": {"type": "Link", "linkType": "Environment", "id": "release-2"}}})
        );
        assert_eq!(state.path().unwrap(), "/spaces/sp/environment_aliases/master");
    }
}
