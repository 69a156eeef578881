use async_trait::async_trait;
use contentful_client::{ApiRequest, StatusCode};
use contentful_core::{ImportFormat, ImportId, Result};
use serde::{Deserialize, Serialize};

use crate::api::{Api, organization_path};
use crate::context::ProviderContext;
use crate::resource::{Resource, require};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEventSubscriptionState {
    pub app_definition_id: String,
    pub target_url: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionBody {
    target_url: String,
    #[serde(default)]
    topics: Vec<String>,
}

impl AppEventSubscriptionState {
    fn draft(&self) -> SubscriptionBody {
        SubscriptionBody {
            target_url: self.target_url.clone(),
            topics: self.topics.clone(),
        }
    }

    fn import(wire: SubscriptionBody, prior: &AppEventSubscriptionState) -> Self {
        Self {
            app_definition_id: prior.app_definition_id.clone(),
            target_url: wire.target_url,
            topics: wire.topics,
        }
    }
}

fn subscription_path(ctx: &ProviderContext, state: &AppEventSubscriptionState) -> Result<String> {
    Ok(format!(
        "{}/app_definitions/{}/event_subscription",
        organization_path(ctx.organization_id()?),
        require("app_definition_id", &state.app_definition_id)?
    ))
}

pub struct AppEventSubscriptionResource;

impl AppEventSubscriptionResource {
    async fn upsert(
        ctx: &ProviderContext,
        plan: &AppEventSubscriptionState,
    ) -> Result<AppEventSubscriptionState> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let request = ApiRequest::put(subscription_path(ctx, plan)?)
            .with_body(serde_json::to_value(plan.draft())?);
        let wire: SubscriptionBody = api
            .send(request, &[StatusCode::OK, StatusCode::CREATED], &plan.app_definition_id)
            .await?;
        Ok(AppEventSubscriptionState::import(wire, plan))
    }
}

#[async_trait]
impl Resource for AppEventSubscriptionResource {
    type State = AppEventSubscriptionState;

    const TYPE_NAME: &'static str = "contentful_app_event_subscription";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(Self::TYPE_NAME, &["appDefinitionId"]);

    fn id(state: &AppEventSubscriptionState) -> Option<&str> {
        Some(state.app_definition_id.as_str())
    }

    fn version(_state: &AppEventSubscriptionState) -> Option<u64> {
        None
    }

    fn state_from_import(id: &ImportId) -> AppEventSubscriptionState {
        AppEventSubscriptionState {
            app_definition_id: id.get("appDefinitionId").to_string(),
            target_url: String::new(),
            topics: Vec::new(),
        }
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        plan: &AppEventSubscriptionState,
    ) -> Result<AppEventSubscriptionState> {
        Self::upsert(ctx, plan).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        current: &AppEventSubscriptionState,
    ) -> Result<Option<AppEventSubscriptionState>> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        let wire: Option<SubscriptionBody> = api
            .fetch(&subscription_path(ctx, current)?, &current.app_definition_id)
            .await?;
        Ok(wire.map(|w| AppEventSubscriptionState::import(w, current)))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        plan: &AppEventSubscriptionState,
        _current: &AppEventSubscriptionState,
    ) -> Result<AppEventSubscriptionState> {
        Self::upsert(ctx, plan).await
    }

    async fn delete(&self, ctx: &ProviderContext, current: &AppEventSubscriptionState) -> Result<()> {
        let api = Api::new(ctx, Self::TYPE_NAME);
        api.remove(
            ApiRequest::delete(subscription_path(ctx, current)?),
            &current.app_definition_id,
        )
        .await
    }
}
