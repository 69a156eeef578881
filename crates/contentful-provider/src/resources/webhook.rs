use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result, Sys};
use serde::{Deserialize, Serialize};

use crate::api::{Api, space_path};
use crate::context::ProviderContext;
use crate::resource::{NEW_ID, Resource, require, require_computed, require_version};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookHeader {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookState {
    pub space_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub headers: Vec<WebhookHeader>,
    #[serde(default)]
    pub http_basic_auth_username: Option<String>,
    /// Write-only; the server never returns it.
    #[serde(default)]
    pub http_basic_auth_password: Option<String>,
    #[serde(default = "active")]
    pub active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookDraft<'a> {
    name: &'a str,
    url: &'a str,
    topics: &'a [String],
    headers: &'a [WebhookHeader],
    #[serde(skip_serializing_if = "Option::is_none")]
    http_basic_username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    http_basic_password: Option<&'a str>,
    active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookWire {
    name: String,
    url: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    headers: Vec<WebhookHeader>,
    #[serde(default)]
    http_basic_username: Option<String>,
    #[serde(default = "active")]
    active: bool,
    sys: Sys,
}

impl WebhookState {
    fn draft(&self) -> WebhookDraft<'_> {
        let username = self.http_basic_auth_username.as_deref().filter(|u| !u.is_empty());
        WebhookDraft {
            name: &self.name,
            url: &self.url,
            topics: &self.topics,
            headers: &self.headers,
            http_basic_username: username,
            http_basic_password: username.and(self.http_basic_auth_password.as_deref()),
            active: self.active,
        }
    }

    fn import(wire: WebhookWire, prior: &WebhookState) -> Self {
        // Secret header values come back blank; keep the ones we sent.
        let headers = wire
            .headers
            .into_iter()
            .map(|mut header| {
                if header.secret
                    && header.value.is_empty()
                    && let Some(known) = prior.headers.iter().find(|h| h.key == header.key)
                {
                    header.value = known.value.clone();
                }
                header
            })
            .collect();

        Self {
            space_id: prior.space_id.clone(),
            id: Some(wire.sys.id),
            version: Some(wire.sys.version),
            name: wire.name,
            url: wire.url,
            topics: wire.topics,
            headers,
            http_basic_auth_username: wire.http_basic_username,
            http_basic_auth_password: prior.http_basic_auth_password.clone(),
            active: wire.active,
        }
    }
}

fn webhooks_path(state: &WebhookState) -> Result<String> {
    Ok(format!(
        "{}/webhook_definitions",
        space_path(require("space_id", &state.space_id)?)
    ))
}

pub struct WebhookResource;

#[async_trait]
impl Resource for WebhookResource {
    type State = WebhookState;

    const TYPE_NAME: &'static str = "contentful_webhook";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["webhookId", "spaceId"]);

    fn id(state: &WebhookState) -> Option<&str> {
        state.id.as_deref()
    }

    fn version(state: &WebhookState) -> Option<u64> {
        state.version
    }

    fn state_from_import(id: &ImportId) -> WebhookState {
        WebhookState {
            space_id: id.get("spaceId").to_string(),
            id: Some(id.get("webhookId").to_string()),
            version: None,
            name: String::new(),
            url: String::new(),
            topics: Vec::new(),
            headers: Vec::new(),
            http_basic_auth_username: None,
            http_basic_auth_password: None,
            active: true,
        }
    }

    async fn create(&self, ctx: &ProviderContext, plan: &WebhookState) -> Result<WebhookState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request =
            ApiRequest::post(webhooks_path(plan)?).with_body(serde_json::to_value(plan.draft())?);
        let wire: WebhookWire = api.send(request, &[StatusCode::CREATED], NEW_ID).await?;
        Ok(WebhookState::import(wire, plan))
    }

    async fn read(&self, ctx: &ProviderContext, current: &WebhookState) -> Result<Option<WebhookState>> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let path = format!("{}/{id}", webhooks_path(current)?);
        let wire: Option<WebhookWire> = api.fetch(&path, id).await?;
        Ok(wire.map(|w| WebhookState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &WebhookState,
        current: &WebhookState,
    ) -> Result<WebhookState> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(format!("{}/{id}", webhooks_path(current)?))
            .with_version(require_version(current.version)?)
            .with_body(serde_json::to_value(plan.draft())?);
        let wire: WebhookWire = api.send(request, &[StatusCode::OK], id).await?;
        Ok(WebhookState::import(wire, plan))
    }

    async fn delete(&self, ctx: &ProviderContext, current: &WebhookState) -> Result<()> {
        let id = require_computed("id", &current.id)?;
        let api = Api::new(ctx, Self::TYPE_NAME);
        let mut request = ApiRequest::delete(format!("{}/{id}", webhooks_path(current)?));
        if let Some(version) = current.version {
            request = request.with_version(version);
        }
        api.remove(request, id).await
    }
}
