use async_trait::async_trait;
use contentful_client::{ApiRequest, SOURCE_ENVIRONMENT_HEADER, StatusCode};
use contentful_core::{ContentfulError, ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{Api, environment_path};
use crate::context::ProviderContext;
use crate::polling::{PollStatus, poll_until};
use crate::resource::{Resource, require, require_version};

const READY: &str = "ready";
const FAILED: &str = "failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub space_id: String,
    /// Caller-chosen environment id.
    pub id: String,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    /// Environment to clone from; not reported back by the server.
    #[serde(default)]
    pub source_environment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentWire {
    name: String,
    sys: Sys,
}

#[derive(Debug, Serialize)]
struct EnvironmentDraft<'a> {
    name: &'a str,
}

impl EnvironmentState {
    fn import(wire: EnvironmentWire, prior: &EnvironmentState) -> Self {
        Self {
            space_id: prior.space_id.clone(),
            status: wire.sys.status_id().map(str::to_string),
            id: wire.sys.id,
            version: Some(wire.sys.version),
            name: wire.name,
            source_environment_id: prior.source_environment_id.clone(),
        }
    }
}

pub struct EnvironmentResource;

impl EnvironmentResource {
    /// Waits until the new environment finished copying its source.
    async fn wait_until_ready(
        ctx: &ProviderContext,
        api: &Api<'_>,
        prior: &EnvironmentState,
    ) -> Result<EnvironmentState> {
        let path = environment_path(&prior.space_id, &prior.id);
        let path = path.as_str();
        poll_until(
            ctx.config().environment_ready.backoff(),
            Self::TYPE_NAME,
            &prior.id,
            move || check_status(api, path, prior),
        )
        .await
    }
}

async fn check_status(
    api: &Api<'_>,
    path: &str,
    prior: &EnvironmentState,
) -> Result<PollStatus<EnvironmentState>> {
    let wire: Option<EnvironmentWire> = api.fetch(path, &prior.id).await?;
    let Some(wire) = wire else {
        return Err(ContentfulError::not_found(api.resource_type(), &prior.id));
    };
    let state = EnvironmentState::import(wire, prior);
    Ok(match state.status.as_deref() {
        Some(READY) => PollStatus::Ready(state),
        Some(FAILED) => PollStatus::Failed("environment creation failed".to_string()),
        _ => PollStatus::Pending,
    })
}

#[async_trait]
impl Resource for EnvironmentResource {
    type State = EnvironmentState;

    const TYPE_NAME: &'static str = "contentful_environment";
    const IMPORT_FORMAT: ImportFormat =
        ImportFormat::new(Self::TYPE_NAME, &["spaceId", "environmentId"]);

    fn id(state: &EnvironmentState) -> Option<&str> {
        Some(state.id.as_str())
    }

    fn version(state: &EnvironmentState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> EnvironmentState {
        EnvironmentState {
            space_id: id.get("spaceId").to_string(),
            id: id.get("environmentId").to_string(),
            version: None,
            name: String::new(),
            source_environment_id: None,
            status: None,
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &EnvironmentState) -> Result<EnvironmentState> {
        let space_id = require("space_id", &plan.space_id)?;
        let id = require("id", &plan.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);

        let mut request = ApiRequest::put(environment_path(space_id, id))
            .with_body(serde_json::to_value(EnvironmentDraft { name: &plan.name })?);
        if let Some(source) = plan.source_environment_id.as_deref().filter(|s| !s.is_empty()) {
            request = request.with_header(SOURCE_ENVIRONMENT_HEADER, source);
        }
        let wire: EnvironmentWire = api
            .send(request, &[StatusCode::CREATED, StatusCode::OK], id)
            .await?;
        let created = EnvironmentState::import(wire, plan);
        if created.status.as_deref() == Some(READY) {
            return Ok(created);
        }

        info!(space_id, id, "waiting for environment to become ready");
        Self::wait_until_ready(ctx, &api, &created).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &EnvironmentState,
    ) -> Result<Option<EnvironmentState>> {
        let path = environment_path(require("space_id", &current.space_id)?, require("id", &current.id)?);
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<EnvironmentWire> = api.fetch(&path, &current.id).await?;
        Ok(wire.map(|w| EnvironmentState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &EnvironmentState,
        current: &EnvironmentState,
    ) -> Result<EnvironmentState> {
        let path = environment_path(require("space_id", &current.space_id)?, require("id", &current.id)?);
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(path)
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(EnvironmentDraft { name: &plan.name })?);
        let wire: EnvironmentWire = api.send(request, &[StatusCode::OK], &current.id).await?;
        Ok(EnvironmentState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &EnvironmentState) -> Result<()> {
        let path = environment_path(require("space_id", &current.space_id)?, require("id", &current.id)?);
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(path);
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, &current.id).await
    }
}
