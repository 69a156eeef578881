//! Type-name registry over JSON state.
//!
//! The orchestrator addresses resources by type name and exchanges state as
//! JSON documents. [`DynResource`] erases the per-resource state type so all
//! reconcilers can sit in one map.

use std::collections::BTreeMap;

use async_trait::async_trait;
use contentful_core::{ContentfulError, ImportFormat, Result};
use serde_json::Value;

use crate::context::ProviderContext;
use crate::engine::Reconciler;
use crate::resource::Resource;
use crate::resources::{
    AppEventSubscriptionResource, AppInstallationResource, AssetResource, ContentTypeResource,
    EditorInterfaceResource, EntryResource, EnvironmentAliasResource, EnvironmentResource,
    LocaleResource, PreviewEnvironmentResource, RoleResource, SpaceResource,
    TaxonomyConceptResource, TeamResource, WebhookResource,
};

/// The five reconciler operations over JSON state.
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn import_format(&self) -> ImportFormat;

    async fn create(&self, desired: Value) -> Result<Value>;

    /// `Ok(None)` when the object is gone.
    async fn read(&self, current: Value) -> Result<Option<Value>>;

    async fn update(&self, desired: Value, current: Value) -> Result<Value>;

    async fn delete(&self, current: Value) -> Result<()>;

    async fn import(&self, id: &str) -> Result<Option<Value>>;
}

fn decode<R: Resource>(value: Value) -> Result<R::State> {
    Ok(serde_json::from_value(value)?)
}

fn encode<R: Resource>(state: &R::State) -> Result<Value> {
    Ok(serde_json::to_value(state)?)
}

#[async_trait]
impl<R: Resource> DynResource for Reconciler<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn import_format(&self) -> ImportFormat {
        R::IMPORT_FORMAT
    }

    async fn create(&self, desired: Value) -> Result<Value> {
        let desired = decode::<R>(desired)?;
        encode::<R>(&Reconciler::create(self, &desired).await?)
    }

    async fn read(&self, current: Value) -> Result<Option<Value>> {
        let current = decode::<R>(current)?;
        Reconciler::read(self, &current)
            .await?
            .map(|state| encode::<R>(&state))
            .transpose()
    }

    async fn update(&self, desired: Value, current: Value) -> Result<Value> {
        let desired = decode::<R>(desired)?;
        let current = decode::<R>(current)?;
        encode::<R>(&Reconciler::update(self, &desired, &current).await?)
    }

    async fn delete(&self, current: Value) -> Result<()> {
        let current = decode::<R>(current)?;
        Reconciler::delete(self, &current).await
    }

    async fn import(&self, id: &str) -> Result<Option<Value>> {
        Reconciler::import(self, id)
            .await?
            .map(|state| encode::<R>(&state))
            .transpose()
    }
}

/// Every supported resource, keyed by type name.
pub struct ContentfulProvider {
    resources: BTreeMap<&'static str, Box<dyn DynResource>>,
}

impl ContentfulProvider {
    pub fn new(ctx: ProviderContext) -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
        };
        provider.register(SpaceResource, &ctx);
        provider.register(EnvironmentResource, &ctx);
        provider.register(LocaleResource, &ctx);
        provider.register(WebhookResource, &ctx);
        provider.register(EntryResource, &ctx);
        provider.register(AssetResource, &ctx);
        provider.register(ContentTypeResource, &ctx);
        provider.register(EditorInterfaceResource, &ctx);
        provider.register(PreviewEnvironmentResource, &ctx);
        provider.register(RoleResource, &ctx);
        provider.register(TaxonomyConceptResource, &ctx);
        provider.register(TeamResource, &ctx);
        provider.register(EnvironmentAliasResource, &ctx);
        provider.register(AppInstallationResource, &ctx);
        provider.register(AppEventSubscriptionResource, &ctx);
        provider
    }

    fn register<R: Resource>(&mut self, resource: R, ctx: &ProviderContext) {
        self.resources
            .insert(R::TYPE_NAME, Box::new(Reconciler::new(resource, ctx.clone())));
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn DynResource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                ContentfulError::invalid_value(
                    "resource type",
                    format!("unknown resource type {type_name:?}"),
                )
            })
    }

    /// Registered type names in lexicographic order.
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}
