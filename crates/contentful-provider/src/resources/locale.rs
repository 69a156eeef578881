use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleState {
    pub space_id: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub fallback_code: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "enabled")]
    pub cda: bool,
    #[serde(default = "enabled")]
    pub cma: bool,
    #[serde(default)]
    pub default: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocaleBody {
    name: String,
    code: String,
    #[serde(default)]
    fallback_code: Option<String>,
    #[serde(default)]
    optional: bool,
    #[serde(default = "enabled")]
    content_delivery_api: bool,
    #[serde(default = "enabled")]
    content_management_api: bool,
    #[serde(default, skip_serializing)]
    default: bool,
}

#[derive(Debug, Deserialize)]
struct LocaleWire {
    #[serde(flatten)]
    body: LocaleBody,
    sys: Sys,
}

impl LocaleState {
    fn draft(&self) -> LocaleBody {
        LocaleBody {
            name: self.name.clone(),
            code: self.code.clone(),
            fallback_code: self.fallback_code.clone().filter(|c| !c.is_empty()),
            optional: self.optional,
            content_delivery_api: self.cda,
            content_management_api: self.cma,
            default: self.default,
        }
    }

    fn import(wire: LocaleWire, prior: &LocaleState, environment: String) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            environment,
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.body.name,
            code: wire.body.code,
            fallback_code: wire.body.fallback_code,
            optional: wire.body.optional,
            cda: wire.body.content_delivery_api,
            cma: wire.body.content_management_api,
            default: wire.body.default,
        }
    }
}

fn locales_path(ctx: &ProviderContext, state: &LocaleState) -> Result<(String, String)> {
    let space_id = require("space_id", &state.space_id)?;
    let environment = ctx.environment_or(&state.environment);
    Ok((
        format!("{}/locales", environment_path(space_id, &environment)),
        environment,
    ))
}

pub struct LocaleResource;

#[async_trait]
impl Resource for LocaleResource {
    type State = LocaleState;

    const TYPE_NAME: &'static str = "contentful_locale";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["localeId", "environment", "spaceId"]);

    fn id(state: &LocaleState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &LocaleState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> LocaleState {
        LocaleState {
            space_id: id.get("spaceId").to_string(),
            environment: id.get("environment").to_string(),
            id: Some(id.get("localeId").to_string()),
            version: None,
            name: String::new(),
            code: String::new(),
            fallback_code: None,
            optional: false,
            cda: true,
            cma: true,
            default: false,
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &LocaleState) -> Result<LocaleState> {
        let (path, environment) = locales_path(ctx, plan)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::post(path).with_body(serde_json::to_value(plan.draft())?);
        let wire: LocaleWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(LocaleState::import(wire, plan, environment))
    }

    async fn read(&self, ctx: &ProviderContext, current: &LocaleState) -> Result<Option<LocaleState>> {
        let id = require_computed("id", &current.id)?;
        let (path, environment) = locales_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<LocaleWire> = api.fetch(&format!("{path}/{id}"), id).await?;
        Ok(wire.map(|w| LocaleState::import(w, current, environment)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &LocaleState,
        current: &LocaleState,
    ) -> Result<LocaleState> {
        let id = require_computed("id", &current.id)?;
        let (path, environment) = locales_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(format!("{path}/{id}"))
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(plan.draft())?);
        let wire: LocaleWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(LocaleState::import(wire, current, environment))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &LocaleState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let (path, _) = locales_path(ctx, current)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(format!("{path}/{id}"));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}
