use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, space_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfiguration {
    pub content_type: String,
    pub url: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub example: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEnvironmentState {
    pub space_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub configurations: Vec<PreviewConfiguration>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewBody {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    configurations: Vec<ConfigurationWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationWire {
    content_type: String,
    url: String,
    #[serde(default = "enabled")]
    enabled: bool,
    #[serde(default)]
    example: bool,
}

#[derive(Debug, Deserialize)]
struct PreviewWire {
    #[serde(flatten)]
    body: PreviewBody,
    sys: Sys,
}

impl PreviewEnvironmentState {
    fn draft(&self) -> PreviewBody {
        PreviewBody {
            name: self.name.clone(),
            description: self.description.clone(),
            configurations: self
                .configurations
                .iter()
                .map(|c| ConfigurationWire {
                    content_type: c.content_type.clone(),
                    url: c.url.clone(),
                    enabled: c.enabled,
                    example: c.example,
                })
                .collect(),
        }
    }

    fn import(wire: PreviewWire, prior: &PreviewEnvironmentState) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.body.name,
            description: wire.body.description,
            configurations: wire
                .body
                .configurations
                .into_iter()
                .map(|c| PreviewConfiguration {
                    content_type: c.content_type,
                    url: c.url,
                    enabled: c.enabled,
                    example: c.example,
                })
                .collect(),
        }
    }
}

fn previews_path(state: &PreviewEnvironmentState) -> Result<String> {
    Ok(format!(
        "{}/preview_environments",
        space_path(require("space_id", &state.space_id)?)
    ))
}

pub struct PreviewEnvironmentResource;

#[async_trait]
impl Resource for PreviewEnvironmentResource {
    type State = PreviewEnvironmentState;

    const TYPE_NAME: &'static str = "contentful_preview_environment";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["previewEnvironmentId", "spaceId"]);

    fn id(state: &PreviewEnvironmentState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &PreviewEnvironmentState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> PreviewEnvironmentState {
        PreviewEnvironmentState {
            space_id: id.get("spaceId").to_string(),
            id: Some(id.get("previewEnvironmentId").to_string()),
            version: None,
            name: String::new(),
            description: String::new(),
            configurations: Vec::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &PreviewEnvironmentState,
    ) -> Result<PreviewEnvironmentState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request =
            ApiRequest::post(previews_path(plan)?).with_body(serde_json::to_value(plan.draft())?);
        let wire: PreviewWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(PreviewEnvironmentState::import(wire, plan))
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &PreviewEnvironmentState,
    ) -> Result<Option<PreviewEnvironmentState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let path = format!("{}/{id}", previews_path(current)?);
        let wire: Option<PreviewWire> = api.fetch(&path, id).await?;
        Ok(wire.map(|w| PreviewEnvironmentState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &PreviewEnvironmentState,
        current: &PreviewEnvironmentState,
    ) -> Result<PreviewEnvironmentState> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(format!("{}/{id}", previews_path(current)?))
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(plan.draft())?);
        let wire: PreviewWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(PreviewEnvironmentState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &PreviewEnvironmentState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(format!("{}/{id}", previews_path(current)?));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}
