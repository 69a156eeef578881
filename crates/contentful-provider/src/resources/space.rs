use async_trait::async_trait;
use contentful_client::{ApiRequest, ORGANIZATION_HEADER, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, space_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require_computed, require_version};

pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    /// Only used at creation; the space API never reports it back.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

#[derive(Debug, Deserialize)]
struct SpaceWire {
    name: String,
    sys: Sys,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpaceDraft<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_locale: Option<&'a str>,
}

impl SpaceState {
    fn import(wire: SpaceWire, prior: &SpaceState) -> Self {
        Self {
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.name,
            default_locale: prior.default_locale.clone(),
        }
    }
}

pub struct SpaceResource;

#[async_trait]
impl Resource for SpaceResource {
    type State = SpaceState;

    const TYPE_NAME: &'static str = "contentful_space";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["spaceId"]);

    fn id(state: &SpaceState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &SpaceState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> SpaceState {
        SpaceState {
            id: Some(id.get("spaceId").to_string()),
            version: None,
            name: String::new(),
            default_locale: default_locale(),
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &SpaceState) -> Result<SpaceState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let draft = SpaceDraft {
            name: &plan.name,
            default_locale: Some(&plan.default_locale),
        };
        let request = ApiRequest::post("/spaces")
            .with_header(ORGANIZATION_HEADER, ctx.organization_id()?)
            .with_body(serde_json::to_value(&draft)?);
        let wire: SpaceWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(SpaceState::import(wire, plan))
    }

    async fn read(&self, ctx: &ProviderContext, current: &SpaceState) -> Result<Option<SpaceState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<SpaceWire> = api.fetch(&space_path(id), id).await?;
        Ok(wire.map(|w| SpaceState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &SpaceState,
        current: &SpaceState,
    ) -> Result<SpaceState> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let draft = SpaceDraft {
            name: &plan.name,
            default_locale: None,
        };
        let request = ApiRequest::put(space_path(id))
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(&draft)?);
        let wire: SpaceWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(SpaceState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &SpaceState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(space_path(id));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}
