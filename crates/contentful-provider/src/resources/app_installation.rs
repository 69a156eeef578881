use async_trait::async_trait;
use contentful_client::{ApiRequest, MARKETPLACE_HEADER, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, content_to_value, normalize_json, value_to_content};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::resource::{Resource, require};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInstallationState {
    pub space_id: String,
    #[serde(default)]
    pub environment_id: String,
    pub app_definition_id: String,
    /// Installation parameters as JSON text.
    #[serde(default = "empty_object")]
    pub parameters: String,
    /// Marketplace terms to accept on install; never reported back.
    #[serde(default)]
    pub accepted_terms: Vec<String>,
}

fn empty_object() -> String {
    "{}".to_string()
}

#[derive(Debug, Deserialize)]
struct InstallationWire {
    #[serde(default)]
    parameters: Option<Value>,
}

impl AppInstallationState {
    fn draft(&self) -> Value {
        json!({ "parameters": content_to_value(&self.parameters) })
    }

    fn import(wire: InstallationWire, prior: &AppInstallationState, environment_id: String) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            environment_id,
            app_definition_id: prior.app_definition_id.clone(),
            parameters: wire
                .parameters
                .as_ref()
                .map(value_to_content)
                .map(|p| normalize_json(&p))
                .unwrap_or_else(empty_object),
            accepted_terms: prior.accepted_terms.clone(),
        }
    }
}

fn installation_path(ctx: &ProviderContext, state: &AppInstallationState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let app = require("app_definition_id", &state.app_definition_id)?;
    let environment = ctx.environment_or(&state.environment_id);
    Ok((
        format!("{}/app_installations/{app}", environment_path(space_id, &environment)),
        environment,
    ))
}

pub struct AppInstallationResource;

impl AppInstallationResource {
    /// Installing and reconfiguring are the same unversioned upsert.
    async fn upsert(ctx: &ProviderContext, plan: &AppInstallationState) -> Result<AppInstallationState> {
        let (path, environment) = installation_path(ctx, plan)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::put(path).with_body(plan.draft());
        if !plan.accepted_terms.is_empty() {
            request = request.with_header(MARKETPLACE_HEADER, plan.accepted_terms.join(","));
        }
        let wire: InstallationWire = api
            .send(request, &[StatusCode::OK, StatusCode::CREATED], &plan.app_definition_id)
            .await?;
        Ok(AppInstallationState::import(wire, plan, environment))
    }
}

#[async_trait]
impl Resource for AppInstallationResource {
    type State = AppInstallationState;

    const TYPE_NAME: &'static str = "contentful_app_installation";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["appDefinitionId", "environmentId", "spaceId"]);

    fn id(state: &AppInstallationState) -> Option<&str> {
        Some(state.app_definition_id.as_str())
    }

    fn version(_state: &AppInstallationState) -> Option<u64> {
        None
    }

    fn state_from_import(id: &ImportId) -> AppInstallationState {
        AppInstallationState {
            space_id: id.get("spaceId").to_string(),
            environment_id: id.get("environmentId").to_string(),
            app_definition_id: id.get("appDefinitionId").to_string(),
            parameters: empty_object(),
            accepted_terms: Vec::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &AppInstallationState,
    ) -> Result<AppInstallationState> {
        Self::upsert(ctx, plan).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &AppInstallationState,
    ) -> Result<Option<AppInstallationState>> {
        let (path, environment) = installation_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<InstallationWire> = api.fetch(&path, &current.app_definition_id).await?;
        Ok(wire.map(|w| AppInstallationState::import(w, current, environment)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &AppInstallationState,
        _current: &AppInstallationState,
    ) -> Result<AppInstallationState> {
        Self::upsert(ctx, plan).await
    }

    async fn delete(&self, ctx: &ProviderContext, current: &AppInstallationState) -> Result<()> {
        let (path, _) = installation_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        api.remove(ApiRequest::delete(path), &current.app_definition_id)
            .await
    }
}
