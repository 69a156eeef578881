use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, organization_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
struct TeamDraft<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct TeamWire {
    name: String,
    #[serde(default)]
    description: Option<String>,
    sys: Sys,
}

impl From<TeamWire> for TeamState {
    fn from(wire: TeamWire) -> Self {
        Self {
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.name,
            description: wire.description.unwrap_or_default(),
        }
    }
}

impl TeamState {
    fn draft(&self) -> TeamDraft<'_> {
        TeamDraft {
            name: &self.name,
            description: &self.description,
        }
    }
}

fn teams_path(ctx: &ProviderContext) -> Result<String> {
    Ok(format!("{}/teams", organization_path(ctx.organization_id()?)))
}

pub struct TeamResource;

#[async_trait]
impl Resource for TeamResource {
    type State = TeamState;

    const TYPE_NAME: &'static str = "contentful_team";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["teamId"]);

    fn id(state: &TeamState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &TeamState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> TeamState {
        TeamState {
            id: Some(id.get("teamId").to_string()),
            version: None,
            name: String::new(),
            description: String::new(),
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &TeamState) -> Result<TeamState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request =
            ApiRequest::post(teams_path(ctx)?).with_body(serde_json::to_value(plan.draft())?);
        let wire: TeamWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(wire.into())
    }

    async fn read(&self, ctx: &ProviderContext, current: &TeamState) -> Result<Option<TeamState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<TeamWire> = api.fetch(&format!("{}/{id}", teams_path(ctx)?), id).await?;
        Ok(wire.map(TeamState::from))
    }

    async fn update(&self, ctx: &ProviderContext, plan: &TeamState, current: &TeamState) -> Result<TeamState> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(format!("{}/{id}", teams_path(ctx)?))
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(plan.draft())?);
        let wire: TeamWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(wire.into())
    }

    async fn delete(&self, ctx: &ProviderContext, current: &TeamState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(format!("{}/{id}", teams_path(ctx)?));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}
